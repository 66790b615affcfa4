use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig, Page};
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::browser::spawn_handler;
use crate::error::BrowserError;

/// 启动浏览器并打开空白页面
///
/// 人工登录需要可见窗口，所以默认有头运行
pub async fn launch_browser(
    headless: bool,
    executable: Option<&str>,
) -> Result<(Browser, Page), BrowserError> {
    info!("🚀 启动浏览器 (无头: {})...", headless);

    let mut builder = BrowserConfig::builder().args(vec![
        "--disable-gpu",
        "--no-sandbox",
        "--disable-dev-shm-usage",
    ]);
    if !headless {
        builder = builder.with_head();
    }
    if let Some(executable) = executable {
        debug!("浏览器路径: {}", executable);
        builder = builder.chrome_executable(Path::new(executable));
    }

    let config = builder.build().map_err(|e| {
        error!("配置浏览器失败: {}", e);
        BrowserError::LaunchFailed { message: e }
    })?;

    let (browser, handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        BrowserError::LaunchFailed {
            message: e.to_string(),
        }
    })?;
    debug!("浏览器启动成功");

    spawn_handler(handler);

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        BrowserError::PageCreationFailed { source: e }
    })?;

    info!("✅ 浏览器已就绪");
    Ok((browser, page))
}
