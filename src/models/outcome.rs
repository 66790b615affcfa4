use serde::{Deserialize, Serialize};

use crate::models::record::Record;

/// 单次"打开-填写-提交-确认"的分类结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptResult {
    /// 页面显示成功消息
    Confirmed {
        payment_reference: String,
        message: String,
    },
    /// 消息出现但不表示成功
    Rejected { reason: String, message: String },
    /// 超时未出现消息
    TimedOut,
}

impl AttemptResult {
    /// 非成功时用于 `last_error` 的描述
    pub fn failure_description(&self) -> Option<String> {
        match self {
            AttemptResult::Confirmed { .. } => None,
            AttemptResult::Rejected { reason, message } => {
                Some(format!("录入未保存: {} ({})", reason, message))
            }
            AttemptResult::TimedOut => Some("录入未保存: 等待成功消息超时".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordStatus {
    Success,
    Failure,
}

/// 一条记录的最终结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub line_number: usize,
    pub status: RecordStatus,
    pub attempts_used: u32,
    /// 仅在成功时存在
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_message: Option<String>,
    /// 仅在失败时存在
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// 最近一次确认检测的分类
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_classification: Option<AttemptResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_artifact: Option<String>,
    pub record: Record,
    pub timestamp: String,
}

impl RecordOutcome {
    pub fn success(
        record: &Record,
        attempts_used: u32,
        payment_reference: String,
        confirmation_message: String,
    ) -> Self {
        Self {
            line_number: record.line_number,
            status: RecordStatus::Success,
            attempts_used,
            payment_reference: Some(payment_reference),
            confirmation_message: Some(confirmation_message),
            last_error: None,
            last_classification: None,
            failure_artifact: None,
            record: record.clone(),
            timestamp: local_timestamp(),
        }
    }

    pub fn failure(
        record: &Record,
        attempts_used: u32,
        last_error: String,
        last_classification: Option<AttemptResult>,
    ) -> Self {
        Self {
            line_number: record.line_number,
            status: RecordStatus::Failure,
            attempts_used,
            payment_reference: None,
            confirmation_message: None,
            last_error: Some(last_error),
            last_classification,
            failure_artifact: None,
            record: record.clone(),
            timestamp: local_timestamp(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RecordStatus::Success
    }
}

pub(crate) fn local_timestamp() -> String {
    chrono::Local::now().format("%d/%m/%Y %H:%M:%S").to_string()
}
