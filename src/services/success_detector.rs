//! 确认检测服务 - 业务能力层
//!
//! 提交后观察确认消息并分类，不修改页面状态

use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::infrastructure::{Locator, PageAutomation};
use crate::models::AttemptResult;

/// 匹配到成功短语但提取不到编号时使用
pub const UNKNOWN_REFERENCE: &str = "N/A";

const REFERENCE_PATTERN: &str = r"Item\(s\) Pagamento gerado\(s\) : (\d+)";

/// 确认检测服务
pub struct SuccessDetector {
    message: Locator,
    success_marker: String,
    reference: Regex,
    timeout: Duration,
}

impl SuccessDetector {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            message: Locator::new(
                &config.layout.form_frames,
                config.layout.confirmation_message.as_str(),
            ),
            success_marker: config.layout.success_marker.clone(),
            reference: Regex::new(REFERENCE_PATTERN)?,
            timeout: config.success_message_timeout(),
        })
    }

    /// 等待确认消息并分类
    pub async fn detect(&self, page: &dyn PageAutomation) -> AttemptResult {
        info!("🔍 检查是否出现成功消息...");

        let visible = match page.wait_for_visible(&self.message, self.timeout).await {
            Ok(visible) => visible,
            Err(e) => {
                debug!("等待确认消息出错: {:#}", e);
                false
            }
        };
        if !visible {
            warn!("❌ 在 {:?} 内没有出现确认消息", self.timeout);
            return AttemptResult::TimedOut;
        }

        let text = match page.text_content(&self.message).await {
            Ok(text) => text,
            Err(e) => {
                warn!("读取确认消息失败: {:#}", e);
                None
            }
        };
        let result = self.classify(text.as_deref());
        match &result {
            AttemptResult::Confirmed {
                payment_reference, ..
            } => info!("✅ 成功已确认！付款编号: {}", payment_reference),
            AttemptResult::Rejected { message, .. } => {
                warn!("⚠️ 出现消息但未表示成功: \"{}\"", message)
            }
            AttemptResult::TimedOut => {}
        }
        result
    }

    /// 按消息文本分类（消息已可见）
    pub fn classify(&self, text: Option<&str>) -> AttemptResult {
        let text = text.unwrap_or_default();
        if text.contains(&self.success_marker) {
            let payment_reference = self
                .reference
                .captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| UNKNOWN_REFERENCE.to_string());
            return AttemptResult::Confirmed {
                payment_reference,
                message: text.trim().to_string(),
            };
        }

        let trimmed = text.trim();
        AttemptResult::Rejected {
            reason: "消息未表示成功".to_string(),
            message: if trimmed.is_empty() {
                "空消息".to_string()
            } else {
                trimmed.to_string()
            },
        }
    }
}
