//! 单条录入的提交流程 - 流程层
//!
//! 状态流转：
//! Idle → Opening → Filling → Submitting → Verifying → {Confirmed, Retrying, Exhausted}
//!
//! 每次尝试彼此独立：Opening 会重置表单，上一次失败时填了一半的字段不会带入下一次。
//! Opening / Filling / Submitting 中出现的任何错误与 Rejected 同样计入重试次数。

use std::fmt;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::infrastructure::{Locator, PageAutomation};
use crate::models::{AttemptResult, Record, RecordOutcome};
use crate::services::{FormFiller, SuccessDetector};
use crate::workflow::record_ctx::RecordCtx;

/// 提交流程的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Opening,
    Filling,
    Submitting,
    Verifying,
    Confirmed,
    Retrying,
    Exhausted,
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// 单条录入的提交流程
///
/// - 编排 打开 → 填写 → 提交 → 确认
/// - 决定何时重试、何时放弃
/// - 不持有 page，只依赖页面能力
pub struct SubmissionFlow {
    filler: FormFiller,
    detector: SuccessDetector,
    /// 工具栏上的"新增"按钮；远端界面用它同时表示"打开"和"保存"
    new_entry_button: Locator,
    max_attempts: u32,
}

impl SubmissionFlow {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            filler: FormFiller::new(config),
            detector: SuccessDetector::new(config)?,
            new_entry_button: Locator::new(
                &config.layout.toolbar_frames,
                config.layout.new_entry_button.as_str(),
            ),
            max_attempts: config.max_attempts.max(1),
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 运行状态机直到得到最终结果
    pub async fn run(
        &self,
        page: &dyn PageAutomation,
        record: &Record,
        ctx: &RecordCtx,
    ) -> RecordOutcome {
        let mut state = SubmissionState::Idle;
        let mut attempt: u32 = 0;
        let mut last_error = String::new();
        let mut last_classification: Option<AttemptResult> = None;
        let mut confirmed: Option<(String, String)> = None;

        loop {
            let next = match state {
                SubmissionState::Idle | SubmissionState::Retrying => {
                    attempt += 1;
                    info!("{} 第 {}/{} 次尝试", ctx, attempt, self.max_attempts);
                    SubmissionState::Opening
                }
                SubmissionState::Opening => match self.open_new_entry(page).await {
                    Ok(()) => SubmissionState::Filling,
                    Err(e) => self.attempt_failed(ctx, attempt, &mut last_error, e),
                },
                SubmissionState::Filling => {
                    self.filler.prepare_form(page).await;
                    match self.filler.fill(page, record).await {
                        Ok(()) => SubmissionState::Submitting,
                        Err(e) => self.attempt_failed(ctx, attempt, &mut last_error, e.into()),
                    }
                }
                SubmissionState::Submitting => match self.commit_entry(page).await {
                    Ok(()) => SubmissionState::Verifying,
                    Err(e) => self.attempt_failed(ctx, attempt, &mut last_error, e),
                },
                SubmissionState::Verifying => {
                    info!("🔍 [4/4] 验证是否保存成功...");
                    match self.detector.detect(page).await {
                        AttemptResult::Confirmed {
                            payment_reference,
                            message,
                        } => {
                            confirmed = Some((payment_reference, message));
                            SubmissionState::Confirmed
                        }
                        other => {
                            let description = other.failure_description().unwrap_or_default();
                            last_classification = Some(other);
                            self.attempt_failed(
                                ctx,
                                attempt,
                                &mut last_error,
                                anyhow::anyhow!(description),
                            )
                        }
                    }
                }
                SubmissionState::Confirmed => {
                    let (payment_reference, message) = confirmed.take().unwrap_or_default();
                    info!("🎉 {} 已确认，付款编号: {}", ctx, payment_reference);
                    return RecordOutcome::success(record, attempt, payment_reference, message);
                }
                SubmissionState::Exhausted => {
                    error!("{} 已用尽 {} 次尝试", ctx, self.max_attempts);
                    return RecordOutcome::failure(record, attempt, last_error, last_classification);
                }
            };
            debug!("{} {} → {}", ctx, state, next);
            state = next;
        }
    }

    /// 打开新录入（第一次点击"新增"）
    async fn open_new_entry(&self, page: &dyn PageAutomation) -> Result<()> {
        info!("➕ [1/4] 点击\"新增\"打开表单...");
        page.click(&self.new_entry_button)
            .await
            .context("打开新录入失败")
    }

    /// 保存录入（第二次点击同一个按钮）
    async fn commit_entry(&self, page: &dyn PageAutomation) -> Result<()> {
        info!("💾 [3/4] 点击\"新增\"保存录入...");
        page.click(&self.new_entry_button)
            .await
            .context("保存录入失败")
    }

    /// 记录失败，并决定重试还是放弃
    fn attempt_failed(
        &self,
        ctx: &RecordCtx,
        attempt: u32,
        last_error: &mut String,
        err: anyhow::Error,
    ) -> SubmissionState {
        *last_error = format!("{:#}", err);
        warn!("❌ {} 第 {} 次尝试失败: {}", ctx, attempt, last_error);

        if attempt < self.max_attempts {
            info!(
                "🔄 重新尝试... (剩余 {} 次)",
                self.max_attempts - attempt
            );
            SubmissionState::Retrying
        } else {
            SubmissionState::Exhausted
        }
    }
}
