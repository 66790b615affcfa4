use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use payment_entry_submit::error::{AppError, AppResult};
use payment_entry_submit::models::load_records;
use payment_entry_submit::services::validate_records;
use payment_entry_submit::utils::logging;
use payment_entry_submit::{App, Config};
use tracing::{error, info, warn};

/// 被中断时的退出码
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    // 加载配置
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            logging::init(false);
            error!("❌ 配置错误: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // 初始化日志
    logging::init(config.verbose_logging);

    match run(config).await {
        Ok(()) => {
            info!("\n✅ 自动化执行完成");
            ExitCode::SUCCESS
        }
        Err(AppError::Interrupted) => {
            warn!("\n🛑 自动化已被中断");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            error!("\n❌ 自动化失败: {}", e);
            error!("📝 请查看日志文件和截图了解详情");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> AppResult<()> {
    if let Err(e) = logging::init_log_file(&config.output_path(&config.output_log_file)) {
        warn!("⚠️ 无法初始化日志文件: {:#}", e);
    }
    logging::log_startup(&config.input_file, config.max_attempts);

    // 读取并校验，任何无效记录都会中止整次运行
    let records = load_records(Path::new(&config.input_file), config.skip_header).await?;
    let records = validate_records(records)?;
    logging::log_preview(&records);

    tokio::select! {
        _ = countdown(config.start_delay_secs) => {}
        _ = shutdown_signal() => return Err(AppError::Interrupted),
    }

    let app = App::initialize(config).await?;

    let result = tokio::select! {
        result = app.run(&records) => Some(result),
        _ = shutdown_signal() => None,
    };

    info!("🧹 正在清理...");
    app.shutdown().await;

    match result {
        Some(result) => result.map(|_| ()),
        None => Err(AppError::Interrupted),
    }
}

/// 开始前倒计时，期间可按 Ctrl+C 取消
async fn countdown(seconds: u64) {
    if seconds == 0 {
        return;
    }
    info!("⏰ {} 秒后开始，按 Ctrl+C 取消！", seconds);
    for remaining in (1..=seconds).rev() {
        info!("⏰ {}...", remaining);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    info!("🚀 开始自动化！");
}

/// 等待 Ctrl+C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
