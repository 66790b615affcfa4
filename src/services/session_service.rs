//! 会话服务 - 业务能力层
//!
//! 登录等待、进入录入页面和注销。登录本身由人工在浏览器中完成。

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::{Locator, PageAutomation};

pub struct SessionService {
    login_url: String,
    logoff_url: String,
    login_predicate: String,
    login_timeout: Duration,
    menu_links: Vec<String>,
}

impl SessionService {
    pub fn new(config: &Config) -> Self {
        Self {
            login_url: config.login_url.clone(),
            logoff_url: config.logoff_url.clone(),
            login_predicate: config.layout.login_detected_predicate.clone(),
            login_timeout: config.login_timeout(),
            menu_links: config.layout.menu_links.clone(),
        }
    }

    /// 打开登录页并等待人工登录完成
    pub async fn await_login(&self, page: &dyn PageAutomation) -> Result<(), AppError> {
        info!("📝 正在打开登录页...");
        page.navigate(&self.login_url)
            .await
            .context("打开登录页失败")?;

        info!("{}", "=".repeat(60));
        info!("🔐 请在浏览器中手动登录，登录后自动继续");
        info!("{}", "=".repeat(60));

        let logged_in = page
            .wait_for_condition(&self.login_predicate, self.login_timeout)
            .await
            .context("检测登录状态失败")?;
        if !logged_in {
            return Err(AppError::LoginTimeout {
                timeout_ms: self.login_timeout.as_millis() as u64,
            });
        }

        info!("✅ 已检测到登录");
        Ok(())
    }

    /// 通过菜单进入录入页面
    pub async fn open_entry_form(&self, page: &dyn PageAutomation) -> Result<()> {
        info!("🧭 正在进入录入页面...");
        for text in &self.menu_links {
            let link = Locator::top("a").with_text(text.as_str());
            page.click(&link)
                .await
                .with_context(|| format!("点击菜单 \"{}\" 失败", text))?;
        }
        Ok(())
    }

    /// 注销；失败只记录警告
    pub async fn logoff(&self, page: &dyn PageAutomation) {
        info!("🚪 正在注销...");
        match page.navigate(&self.logoff_url).await {
            Ok(()) => info!("✅ 已注销"),
            Err(e) => warn!("⚠️ 注销出错: {:#}，继续关闭浏览器...", e),
        }
    }
}
