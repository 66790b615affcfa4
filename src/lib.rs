//! # Payment Entry Submit
//!
//! 从表格读取付款记录，逐条录入远端系统的多层 iframe 表单，
//! 通过页面上的确认消息判断是否成功，失败时有限次重试，最后输出执行报告。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `PageAutomation` - 页面能力集合（定位、填写、点击、等待、截图）
//! - `ChromiumPage` - 基于 chromiumoxide 的实现，唯一的 page owner
//!
//! ### ② 业务能力层（Services）
//! - `record_validator` - 批量校验
//! - `FormFiller` - 填写一条记录
//! - `SuccessDetector` - 判断提交结果
//! - `ArtifactWriter` - 报告、截图、严重错误日志
//! - `SessionService` - 登录等待、进入页面、注销
//!
//! ### ③ 流程层（Workflow）
//! - `SubmissionFlow` - 单条记录的状态机与重试策略
//!
//! ### ④ 编排层（Orchestration）
//! - `BatchOrchestrator` - 顺序处理整批记录
//! - `App` - 浏览器会话与整次运行

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, PageLayout};
pub use error::{AppError, AppResult};
pub use infrastructure::{ChromiumPage, JsExecutor, Locator, PageAutomation};
pub use models::{AttemptResult, ExecutionReport, Record, RecordOutcome, RecordStatus};
pub use orchestrator::{App, BatchOrchestrator};
pub use workflow::{RecordCtx, SubmissionFlow, SubmissionState};
