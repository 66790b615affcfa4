//! 表单填写服务 - 业务能力层
//!
//! 只负责"把一条记录填进表单"，不负责打开表单或提交

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{Config, PageLayout};
use crate::error::FillError;
use crate::infrastructure::{Locator, PageAutomation};
use crate::models::Record;

/// 表单字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    RubricCode,
    ProviderCode,
    PeriodRef,
    GrossAmount,
    ExpectedPaymentDate,
    Notes,
}

impl FormField {
    /// 固定的填写顺序
    pub const FILL_ORDER: [FormField; 6] = [
        FormField::RubricCode,
        FormField::ProviderCode,
        FormField::PeriodRef,
        FormField::GrossAmount,
        FormField::ExpectedPaymentDate,
        FormField::Notes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FormField::RubricCode => "rubric_code",
            FormField::ProviderCode => "provider_code",
            FormField::PeriodRef => "period_ref",
            FormField::GrossAmount => "gross_amount",
            FormField::ExpectedPaymentDate => "expected_payment_date",
            FormField::Notes => "notes",
        }
    }

    /// 查找类字段：离开焦点后远端会联动加载关联信息
    pub fn is_lookup(self) -> bool {
        matches!(self, FormField::RubricCode | FormField::ProviderCode)
    }

    pub fn value(self, record: &Record) -> &str {
        match self {
            FormField::RubricCode => &record.rubric_code,
            FormField::ProviderCode => &record.provider_code,
            FormField::PeriodRef => &record.period_ref,
            FormField::GrossAmount => &record.gross_amount,
            FormField::ExpectedPaymentDate => &record.expected_payment_date,
            FormField::Notes => &record.notes,
        }
    }

    pub fn selector(self, layout: &PageLayout) -> &str {
        match self {
            FormField::RubricCode => &layout.rubric_code_field,
            FormField::ProviderCode => &layout.provider_code_field,
            FormField::PeriodRef => &layout.period_ref_field,
            FormField::GrossAmount => &layout.gross_amount_field,
            FormField::ExpectedPaymentDate => &layout.expected_payment_date_field,
            FormField::Notes => &layout.notes_field,
        }
    }
}

/// 表单填写服务
///
/// 远端系统在表单清空和查找字段联动完成时都不给出信号，
/// 这里只能用固定时长等待，两者均可配置。
pub struct FormFiller {
    layout: PageLayout,
    attach_timeout: Duration,
    form_clear_settle: Duration,
    field_load_settle: Duration,
}

impl FormFiller {
    pub fn new(config: &Config) -> Self {
        Self {
            layout: config.layout.clone(),
            attach_timeout: config.navigation_timeout(),
            form_clear_settle: config.form_clear_settle(),
            field_load_settle: config.field_load_settle(),
        }
    }

    fn locator(&self, field: FormField) -> Locator {
        Locator::new(&self.layout.form_frames, field.selector(&self.layout))
    }

    /// 等待表单被清空/就绪
    ///
    /// 先等第一个查找字段附着，再固定等待。等待失败只记录警告，
    /// 随后的填写会暴露真正的问题。
    pub async fn prepare_form(&self, page: &dyn PageAutomation) {
        info!("🧹 等待表单清空/就绪...");
        let first = self.locator(FormField::RubricCode);
        match page.wait_for_attached(&first, self.attach_timeout).await {
            Ok(true) => {
                sleep(self.form_clear_settle).await;
                info!("✅ 表单已就绪");
            }
            Ok(false) => warn!("⚠️ 等待表单字段超时: {}，继续执行...", first),
            Err(e) => warn!("⚠️ 等待表单清空出错: {:#}，继续执行...", e),
        }
    }

    /// 按固定顺序填写所有非空字段
    pub async fn fill(&self, page: &dyn PageAutomation, record: &Record) -> Result<(), FillError> {
        info!("📋 正在填写第 {} 行数据...", record.line_number);

        for field in FormField::FILL_ORDER {
            self.fill_field(page, field, field.value(record))
                .await
                .map_err(|source| FillError {
                    field: field.name(),
                    source,
                })?;
        }

        info!("✅ 第 {} 行表单填写完成", record.line_number);
        Ok(())
    }

    async fn fill_field(
        &self,
        page: &dyn PageAutomation,
        field: FormField,
        value: &str,
    ) -> anyhow::Result<()> {
        // 空字段跳过，表单此时已被清空
        if value.is_empty() {
            return Ok(());
        }

        info!("✏️ 填写 {}: {}", field.name(), value);
        let locator = self.locator(field);
        page.fill(&locator, value).await?;

        if field.is_lookup() {
            page.press_key(&locator, "Tab").await?;
            debug!("⏳ 等待 {} 联动加载 {:?}", field.name(), self.field_load_settle);
            sleep(self.field_load_settle).await;
        }
        Ok(())
    }
}
