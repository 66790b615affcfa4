use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::config::ConfigSnapshot;
use crate::models::outcome::{RecordOutcome, RecordStatus};

/// 一次完整运行的执行报告
///
/// 运行结束时组装一次，写入磁盘后不再修改。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub elapsed_ms: i64,
    pub elapsed_minutes: f64,
    pub total_records: usize,
    pub success_count: usize,
    pub failure_count: usize,
    /// 百分比，一位小数，如 "66.7%"
    pub success_rate: String,
    pub configuration: ConfigSnapshot,
    pub details: Vec<RecordOutcome>,
}

impl ExecutionReport {
    /// 由按处理顺序排列的结果汇总报告
    pub fn assemble(
        outcomes: Vec<RecordOutcome>,
        start_time: DateTime<Local>,
        end_time: DateTime<Local>,
        configuration: ConfigSnapshot,
    ) -> Self {
        let total_records = outcomes.len();
        let success_count = count_status(&outcomes, RecordStatus::Success);
        let failure_count = count_status(&outcomes, RecordStatus::Failure);
        let elapsed_ms = (end_time - start_time).num_milliseconds().max(0);

        Self {
            start_time,
            end_time,
            elapsed_ms,
            elapsed_minutes: (elapsed_ms as f64 / 60_000.0 * 100.0).round() / 100.0,
            total_records,
            success_count,
            failure_count,
            success_rate: success_rate(success_count, total_records),
            configuration,
            details: outcomes,
        }
    }

    /// 报告文件名，时间戳可安全用于文件系统
    pub fn file_name(&self) -> String {
        format!(
            "relatorio_execucao_{}.json",
            self.end_time
                .with_timezone(&chrono::Utc)
                .format("%Y-%m-%dT%H-%M-%S")
        )
    }
}

fn count_status(outcomes: &[RecordOutcome], status: RecordStatus) -> usize {
    outcomes.iter().filter(|o| o.status == status).count()
}

/// 保留一位小数，.x5 向上进位；空批次记为 0.0%
pub fn success_rate(success: usize, total: usize) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    let tenths = (success as f64 * 1000.0 / total as f64).round();
    format!("{:.1}%", tenths / 10.0)
}
