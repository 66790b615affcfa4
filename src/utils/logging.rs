use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::models::{ExecutionReport, Record, RecordOutcome, RecordStatus};

/// 初始化 tracing 订阅器
///
/// `RUST_LOG` 优先；否则按 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // 测试中可能重复初始化，忽略错误
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &Path) -> Result<()> {
    let log_header = format!(
        "{}\n付款录入日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(input_file: &str, max_attempts: u32) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 付款录入自动化");
    info!("⚠️ 注意: 本次执行会在系统中保存录入数据！");
    info!("📄 输入文件: {}", input_file);
    info!("🔁 每条记录最多尝试: {} 次", max_attempts);
    info!("{}", "=".repeat(60));
}

/// 启动前预览前三条记录
pub fn log_preview(records: &[Record]) {
    info!("📊 表格预览 (共 {} 条):", records.len());
    for record in records.iter().take(3) {
        info!(
            "   第 {} 行: {} | {} | {}",
            record.line_number, record.rubric_code, record.provider_code, record.gross_amount
        );
    }
    if records.len() > 3 {
        info!("   ... 以及另外 {} 条", records.len() - 3);
    }
}

/// 记录单条开始信息
///
/// # 参数
/// - `index`: 当前序号（从 1 开始）
/// - `total`: 总数
/// - `record`: 当前记录
pub fn log_record_start(index: usize, total: usize, record: &Record) {
    info!("\n{}", "─".repeat(60));
    info!("🔄 处理第 {}/{} 条录入", index, total);
    info!(
        "📋 数据: {} | {} | {}",
        record.rubric_code, record.provider_code, record.gross_amount
    );
}

/// 记录单条结果
pub fn log_record_outcome(outcome: &RecordOutcome) {
    match outcome.status {
        RecordStatus::Success => info!(
            "🎉 第 {} 行已确认，付款编号: {} (尝试 {} 次)",
            outcome.line_number,
            outcome.payment_reference.as_deref().unwrap_or("N/A"),
            outcome.attempts_used
        ),
        RecordStatus::Failure => error!(
            "❌ 第 {} 行最终失败 (尝试 {} 次): {}",
            outcome.line_number,
            outcome.attempts_used,
            truncate_text(outcome.last_error.as_deref().unwrap_or("未知错误"), 200)
        ),
    }
}

/// 打印最终统计信息
pub fn print_final_stats(report: &ExecutionReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!("完成时间: {}", report.end_time.format("%Y-%m-%d %H:%M:%S"));
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}", report.success_count);
    info!("❌ 失败: {}", report.failure_count);
    info!("📋 总计: {}", report.total_records);
    info!("📈 成功率: {}", report.success_rate);
    info!("⏱️ 耗时: {} 分钟", report.elapsed_minutes);
    info!("{}", "=".repeat(60));
    if report.success_count == report.total_records {
        info!("🎉 全部录入均已成功！");
    } else if report.success_count > 0 {
        warn!("⚠️ 处理完成，但存在失败记录，请查看报告");
    } else {
        error!("❌ 没有任何记录录入成功，请检查错误信息");
    }
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
