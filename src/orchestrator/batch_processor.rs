//! 应用主流程 - 编排层
//!
//! ## 职责
//!
//! 持有浏览器会话，负责一次完整运行的生命周期。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：连接或启动浏览器、创建页面适配器
//! 2. **会话准备**：等待人工登录、进入录入页面
//! 3. **批量处理**：委托 `BatchOrchestrator` 顺序处理所有记录
//! 4. **收尾**：输出统计、写报告、注销、关闭浏览器
//! 5. **严重错误留档**：截图 + JSON 日志（含已完成的结果）
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 Browser 的模块
//! - **严格串行**：页面会话只有一个，不做任何并发

use chromiumoxide::Browser;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{ChromiumPage, JsExecutor, PageAutomation};
use crate::models::{ExecutionReport, Record};
use crate::orchestrator::record_processor::BatchOrchestrator;
use crate::services::SessionService;
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    browser: Browser,
    page: ChromiumPage,
    session: SessionService,
}

impl App {
    /// 初始化应用：连接已有浏览器或启动新浏览器
    pub async fn initialize(config: Config) -> AppResult<Self> {
        let (browser, page) = match config.browser_debug_port {
            Some(port) => browser::connect_to_browser_and_page(port).await?,
            None => {
                browser::launch_browser(config.headless, config.chrome_executable.as_deref())
                    .await?
            }
        };

        let page = ChromiumPage::new(
            JsExecutor::new(page),
            config.navigation_timeout(),
            config.poll_interval(),
        );
        let session = SessionService::new(&config);

        Ok(Self {
            config,
            browser,
            page,
            session,
        })
    }

    /// 运行：登录 → 进入页面 → 批量处理 → 报告 → 注销
    ///
    /// 出现严重错误时先留档再返回错误
    pub async fn run(&self, records: &[Record]) -> AppResult<ExecutionReport> {
        let mut orchestrator = BatchOrchestrator::new(&self.config)?;

        match self.drive(&mut orchestrator, records).await {
            Ok(report) => Ok(report),
            Err(err) => {
                error!("❌ 自动化过程中出现严重错误: {}", err);
                let page: &dyn PageAutomation = &self.page;
                orchestrator
                    .artifacts()
                    .capture_critical(Some(page), &err, orchestrator.outcomes())
                    .await;
                Err(err)
            }
        }
    }

    async fn drive(
        &self,
        orchestrator: &mut BatchOrchestrator,
        records: &[Record],
    ) -> AppResult<ExecutionReport> {
        self.session.await_login(&self.page).await?;
        self.session.open_entry_form(&self.page).await?;

        let report = orchestrator.process_all(&self.page, records).await;
        logging::print_final_stats(&report);

        if let Some(path) = orchestrator.artifacts().write_report(&report).await {
            info!("📄 详细报告: {}", path.display());
        }

        self.session.logoff(&self.page).await;
        Ok(report)
    }

    /// 关闭浏览器（尽力而为）
    pub async fn shutdown(mut self) {
        match self.browser.close().await {
            Ok(_) => info!("🏁 浏览器已关闭"),
            Err(e) => warn!("⚠️ 关闭浏览器出错: {}", e),
        }
    }
}
