use serde::{Deserialize, Serialize};

/// 一条待录入的付款记录
///
/// 从表格行创建后不再修改。可选字段以空字符串表示"未填写"。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// 在输入中的位置（从 1 开始，已跳过空行）
    pub line_number: usize,
    /// 费用类型代码（必填）
    pub rubric_code: String,
    /// 服务提供方代码（必填）
    pub provider_code: String,
    /// 参考月份 MM/YYYY（可选）
    pub period_ref: String,
    /// 毛金额（必填）
    pub gross_amount: String,
    /// 预计付款日期 DD/MM/YYYY（可选）
    pub expected_payment_date: String,
    /// 备注（可选）
    pub notes: String,
}

impl Record {
    /// 按固定列顺序从一行单元格构建
    ///
    /// 列顺序：费用类型、提供方、参考月份、金额、付款日期、备注。缺失的列视为空。
    pub fn from_cells(line_number: usize, cells: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).map(|c| c.trim().to_string()).unwrap_or_default();
        Self {
            line_number,
            rubric_code: cell(0),
            provider_code: cell(1),
            period_ref: cell(2),
            gross_amount: cell(3),
            expected_payment_date: cell(4),
            notes: cell(5),
        }
    }
}
