//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用主流程
//! - 管理浏览器会话生命周期（初始化、运行、关闭）
//! - 等待登录、进入录入页面
//! - 严重错误留档
//!
//! ### `record_processor` - 批量录入处理器
//! - 按输入顺序逐条调用 `SubmissionFlow`
//! - 最终失败时截图
//! - 汇总执行报告
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (会话 + 整次运行)
//!     ↓
//! record_processor (处理 Vec<Record>)
//!     ↓
//! workflow::SubmissionFlow (处理单条 Record)
//!     ↓
//! services (能力层：fill / detect / artifacts)
//!     ↓
//! infrastructure (基础设施：PageAutomation)
//! ```

pub mod batch_processor;
pub mod record_processor;

// 重新导出主要类型
pub use batch_processor::App;
pub use record_processor::BatchOrchestrator;
