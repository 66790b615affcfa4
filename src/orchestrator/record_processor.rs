//! 批量录入处理器 - 编排层
//!
//! ## 职责
//!
//! 按输入顺序逐条处理记录，是批次级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **顺序遍历**：严格串行，所有操作共享同一个页面会话
//! 2. **流程调度**：每条记录交给 `SubmissionFlow`
//! 3. **失败留档**：最终失败时保存整页截图
//! 4. **结果汇总**：按处理顺序累积 `RecordOutcome`，最后组装报告
//!
//! 单条记录的最终失败不会中止批次。

use chrono::Local;

use crate::config::{Config, ConfigSnapshot};
use crate::infrastructure::PageAutomation;
use crate::models::{ExecutionReport, Record, RecordOutcome};
use crate::services::ArtifactWriter;
use crate::utils::logging;
use crate::workflow::{RecordCtx, SubmissionFlow};

/// 批量录入处理器
pub struct BatchOrchestrator {
    flow: SubmissionFlow,
    artifacts: ArtifactWriter,
    snapshot: ConfigSnapshot,
    outcomes: Vec<RecordOutcome>,
}

impl BatchOrchestrator {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            flow: SubmissionFlow::new(config)?,
            artifacts: ArtifactWriter::new(&config.output_dir),
            snapshot: config.snapshot(),
            outcomes: Vec::new(),
        })
    }

    /// 已完成记录的结果（中途出错时用于留档）
    pub fn outcomes(&self) -> &[RecordOutcome] {
        &self.outcomes
    }

    /// 处理一条记录并追加结果
    pub async fn process_record(
        &mut self,
        page: &dyn PageAutomation,
        record: &Record,
        ctx: RecordCtx,
    ) -> &RecordOutcome {
        logging::log_record_start(ctx.index, ctx.total, record);

        let mut outcome = self.flow.run(page, record, &ctx).await;
        if !outcome.is_success() {
            outcome.failure_artifact = self
                .artifacts
                .capture_record_failure(page, record.line_number)
                .await
                .map(|p| p.display().to_string());
            tracing::info!("⏭️ 继续处理下一条...");
        }

        logging::log_record_outcome(&outcome);
        self.outcomes.push(outcome);
        &self.outcomes[self.outcomes.len() - 1]
    }

    /// 顺序处理全部记录并组装报告
    pub async fn process_all(
        &mut self,
        page: &dyn PageAutomation,
        records: &[Record],
    ) -> ExecutionReport {
        let start_time = Local::now();
        let total = records.len();
        tracing::info!("\n🔄 === 开始处理录入，共 {} 条 ===", total);

        for (index, record) in records.iter().enumerate() {
            let ctx = RecordCtx::new(index + 1, total, record.line_number);
            self.process_record(page, record, ctx).await;
        }

        self.finish(start_time)
    }

    /// 用已累积的结果组装报告
    pub fn finish(&self, start_time: chrono::DateTime<Local>) -> ExecutionReport {
        ExecutionReport::assemble(
            self.outcomes.clone(),
            start_time,
            Local::now(),
            self.snapshot.clone(),
        )
    }

    pub fn artifacts(&self) -> &ArtifactWriter {
        &self.artifacts
    }
}
