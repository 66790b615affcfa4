//! 产物写入服务 - 业务能力层
//!
//! 负责执行报告、失败截图和严重错误日志。全部为尽力而为：
//! 写入失败只记录日志，不会让运行失败。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::infrastructure::PageAutomation;
use crate::models::{ExecutionReport, RecordOutcome};

/// 严重错误日志
#[derive(Debug, Serialize)]
pub struct CriticalErrorLog<'a> {
    pub timestamp: String,
    pub error: String,
    pub stack: String,
    pub processed_until_error: &'a [RecordOutcome],
}

/// 产物写入服务
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 写入执行报告，返回文件路径
    pub async fn write_report(&self, report: &ExecutionReport) -> Option<PathBuf> {
        let path = self.output_dir.join(report.file_name());
        match self.write_json(&path, report).await {
            Ok(()) => {
                info!("📄 执行报告已保存: {}", path.display());
                Some(path)
            }
            Err(e) => {
                error!("❌ 保存执行报告失败: {:#}", e);
                None
            }
        }
    }

    /// 记录最终失败时保存整页截图
    pub async fn capture_record_failure(
        &self,
        page: &dyn PageAutomation,
        line_number: usize,
    ) -> Option<PathBuf> {
        let path = self.output_dir.join(format!(
            "erro_lancamento_{}_{}.png",
            line_number,
            epoch_millis()
        ));
        self.capture(page, path).await
    }

    /// 严重错误：截图 + JSON 日志
    pub async fn capture_critical(
        &self,
        page: Option<&dyn PageAutomation>,
        err: &(dyn std::error::Error + Send + Sync + 'static),
        outcomes: &[RecordOutcome],
    ) {
        let millis = epoch_millis();

        if let Some(page) = page {
            self.capture(page, self.output_dir.join(format!("erro_critico_{}.png", millis)))
                .await;
        }

        let log = CriticalErrorLog {
            timestamp: crate::models::outcome::local_timestamp(),
            error: err.to_string(),
            stack: error_chain(err),
            processed_until_error: outcomes,
        };
        let path = self
            .output_dir
            .join(format!("log_erro_critico_{}.json", millis));
        match self.write_json(&path, &log).await {
            Ok(()) => info!("📄 严重错误日志已保存: {}", path.display()),
            Err(e) => error!("❌ 无法保存严重错误日志: {:#}", e),
        }
    }

    async fn capture(&self, page: &dyn PageAutomation, path: PathBuf) -> Option<PathBuf> {
        if let Err(e) = self.ensure_dir().await {
            warn!("⚠️ 无法创建输出目录: {:#}", e);
            return None;
        }
        match page.capture_full_page_image(&path).await {
            Ok(()) => {
                info!("📸 截图已保存: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("⚠️ 截图失败 {}: {:#}", path.display(), e);
                None
            }
        }
    }

    async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        self.ensure_dir().await?;
        let json = serde_json::to_string_pretty(value)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("写入文件失败: {}", path.display()))?;
        Ok(())
    }

    async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("无法创建目录: {}", self.output_dir.display()))
    }
}

/// 逐层展开错误来源
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut chain = format!("{:?}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(&format!("\n  caused by: {}", cause));
        source = cause.source();
    }
    chain
}

fn epoch_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
