use chromiumoxide::{Browser, Page};
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::browser::spawn_handler;
use crate::error::BrowserError;

/// 连接到已打开的浏览器并获取页面
///
/// 优先复用已有页面，没有时创建空白页面
pub async fn connect_to_browser_and_page(port: u16) -> Result<(Browser, Page), BrowserError> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        BrowserError::ConnectionFailed { port, source: e }
    })?;
    debug!("浏览器连接成功");

    spawn_handler(handler);

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser
        .pages()
        .await
        .map_err(|e| BrowserError::PageCreationFailed { source: e })?;
    debug!("获取到 {} 个页面", pages.len());

    if let Some(page) = pages.into_iter().next() {
        info!("✓ 复用已有页面");
        return Ok((browser, page));
    }

    debug!("创建空白页面");
    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建空白页面失败: {}", e);
        BrowserError::PageCreationFailed { source: e }
    })?;

    Ok((browser, page))
}
