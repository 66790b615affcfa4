//! 录入处理上下文
//!
//! 封装"我正在处理第几条、共几条"这一信息

use std::fmt::Display;

/// 录入处理上下文
#[derive(Debug, Clone, Copy)]
pub struct RecordCtx {
    /// 处理顺序（从1开始，仅用于日志显示）
    pub index: usize,

    /// 本批总数
    pub total: usize,

    /// 记录在输入中的行号
    pub line_number: usize,
}

impl RecordCtx {
    pub fn new(index: usize, total: usize, line_number: usize) -> Self {
        Self {
            index,
            total,
            line_number,
        }
    }
}

impl Display for RecordCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[录入 {}/{} 行#{}]", self.index, self.total, self.line_number)
    }
}
