//! 页面自动化能力 - 基础设施层
//!
//! 核心流程只依赖这里的能力集合，不依赖具体的浏览器引擎。

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

/// 元素定位描述
///
/// `frames` 为由外到内的 iframe 选择器链，`selector` 在最内层文档中查找。
/// `text` 不为空时，只匹配文本包含该内容的元素。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    pub frames: Vec<String>,
    pub selector: String,
    pub text: Option<String>,
}

impl Locator {
    pub fn new(frames: &[String], selector: impl Into<String>) -> Self {
        Self {
            frames: frames.to_vec(),
            selector: selector.into(),
            text: None,
        }
    }

    /// 在顶层文档中定位
    pub fn top(selector: impl Into<String>) -> Self {
        Self::new(&[], selector)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            write!(f, "{} >> ", frame)?;
        }
        write!(f, "{}", self.selector)?;
        if let Some(text) = &self.text {
            write!(f, " [text~={}]", text)?;
        }
        Ok(())
    }
}

/// 页面自动化能力
///
/// 所有等待都有明确的超时；返回 `Ok(false)` 表示超时而非出错。
#[async_trait]
pub trait PageAutomation: Send + Sync {
    async fn fill(&self, locator: &Locator, value: &str) -> Result<()>;

    async fn click(&self, locator: &Locator) -> Result<()>;

    async fn press_key(&self, locator: &Locator, key: &str) -> Result<()>;

    async fn wait_for_visible(&self, locator: &Locator, timeout: Duration) -> Result<bool>;

    async fn wait_for_attached(&self, locator: &Locator, timeout: Duration) -> Result<bool>;

    /// 元素文本；元素不存在时为 `None`
    async fn text_content(&self, locator: &Locator) -> Result<Option<String>>;

    async fn navigate(&self, url: &str) -> Result<()>;

    /// 轮询页面内的 JS 表达式直到为真
    async fn wait_for_condition(&self, predicate: &str, timeout: Duration) -> Result<bool>;

    async fn capture_full_page_image(&self, path: &Path) -> Result<()>;
}
