pub mod connection;
pub mod launch;

pub use connection::connect_to_browser_and_page;
pub use launch::launch_browser;

use chromiumoxide::Handler;
use futures::StreamExt;

/// 在后台处理浏览器事件
pub(crate) fn spawn_handler(mut handler: Handler) {
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });
}
