pub mod chromium_page;
pub mod js_executor;
pub mod page_automation;

pub use chromium_page::ChromiumPage;
pub use js_executor::JsExecutor;
pub use page_automation::{Locator, PageAutomation};
