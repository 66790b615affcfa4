//! 基于 chromiumoxide 的页面自动化实现
//!
//! 目标页面的 iframe 与顶层同源，因此通过注入脚本逐层进入
//! `contentDocument` 定位元素，而不是切换 CDP 执行上下文。

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::infrastructure::js_executor::JsExecutor;
use crate::infrastructure::page_automation::{Locator, PageAutomation};

#[derive(Debug, Deserialize)]
struct ElementReply {
    found: bool,
    #[serde(default)]
    value: JsonValue,
}

/// chromiumoxide 页面适配器
pub struct ChromiumPage {
    executor: JsExecutor,
    /// fill / click / press 之前等待元素出现的上限
    action_timeout: Duration,
    poll_interval: Duration,
}

impl ChromiumPage {
    pub fn new(executor: JsExecutor, action_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            executor,
            action_timeout,
            poll_interval,
        }
    }

    /// 在定位到的元素上执行 `body`，body 必须返回 `{ found: true, value? }`
    async fn on_element(&self, locator: &Locator, body: &str) -> Result<ElementReply> {
        let script = element_script(locator, body)?;
        self.executor.eval_as(script).await
    }

    /// 等待元素附着后执行动作，模拟自动等待
    async fn act(&self, locator: &Locator, body: &str) -> Result<JsonValue> {
        if !self.wait_for_attached(locator, self.action_timeout).await? {
            bail!("等待元素超时 ({} ms): {}", self.action_timeout.as_millis(), locator);
        }
        let reply = self.on_element(locator, body).await?;
        if !reply.found {
            bail!("元素已从页面移除: {}", locator);
        }
        Ok(reply.value)
    }

    /// 轮询直到条件为真或超时；单次检查出错视为"尚未满足"
    async fn poll<F, Fut>(&self, timeout: Duration, mut check: F) -> Result<bool>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<bool>> + Send,
    {
        let deadline = Instant::now() + timeout;
        loop {
            match check().await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(e) => debug!("轮询检查出错，继续等待: {:#}", e),
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl PageAutomation for ChromiumPage {
    async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        debug!("fill {} = {}", locator, value);
        self.act(locator, &fill_body(value)?).await?;
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        debug!("click {}", locator);
        self.act(locator, "el.click(); return { found: true };").await?;
        Ok(())
    }

    async fn press_key(&self, locator: &Locator, key: &str) -> Result<()> {
        debug!("press {} on {}", key, locator);
        self.act(locator, &key_body(key)?).await?;
        Ok(())
    }

    async fn wait_for_visible(&self, locator: &Locator, timeout: Duration) -> Result<bool> {
        let body = r#"
            const style = el.ownerDocument.defaultView.getComputedStyle(el);
            const rect = el.getBoundingClientRect();
            const visible = style.display !== 'none'
                && style.visibility !== 'hidden'
                && rect.width > 0
                && rect.height > 0;
            return { found: true, value: visible };
        "#;
        self.poll(timeout, move || async move {
            let reply = self.on_element(locator, body).await?;
            Ok(reply.found && reply.value.as_bool().unwrap_or(false))
        })
        .await
    }

    async fn wait_for_attached(&self, locator: &Locator, timeout: Duration) -> Result<bool> {
        self.poll(timeout, move || async move {
            Ok(self
                .on_element(locator, "return { found: true };")
                .await?
                .found)
        })
        .await
    }

    async fn text_content(&self, locator: &Locator) -> Result<Option<String>> {
        let reply = self
            .on_element(locator, "return { found: true, value: el.textContent };")
            .await?;
        if !reply.found {
            return Ok(None);
        }
        Ok(reply.value.as_str().map(str::to_string))
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.executor.goto(url).await
    }

    async fn wait_for_condition(&self, predicate: &str, timeout: Duration) -> Result<bool> {
        let script = format!(
            "(() => {{ try {{ return Boolean({}); }} catch (e) {{ return false; }} }})()",
            predicate
        );
        let script = script.as_str();
        self.poll(timeout, move || async move { self.executor.eval_as::<bool>(script).await })
            .await
    }

    async fn capture_full_page_image(&self, path: &Path) -> Result<()> {
        self.executor.save_full_page_screenshot(path).await
    }
}

/// 设置值并只触发 `input`；`change` 留给 Tab 提交
fn fill_body(value: &str) -> Result<String> {
    Ok(format!(
        r#"
        el.focus();
        el.value = {value};
        el.dispatchEvent(new Event('input', {{ bubbles: true }}));
        return {{ found: true }};
        "#,
        value = serde_json::to_string(value)?
    ))
}

/// 按键事件；Tab 额外触发 `change` 并失去焦点
fn key_body(key: &str) -> Result<String> {
    Ok(format!(
        r#"
        const key = {key};
        const init = {{ key, bubbles: true, cancelable: true }};
        el.dispatchEvent(new KeyboardEvent('keydown', init));
        el.dispatchEvent(new KeyboardEvent('keyup', init));
        if (key === 'Tab') {{
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            el.blur();
        }}
        return {{ found: true }};
        "#,
        key = serde_json::to_string(key)?
    ))
}

/// 生成"逐层进入 iframe 并定位元素"的脚本
fn element_script(locator: &Locator, body: &str) -> Result<String> {
    Ok(format!(
        r#"
        (() => {{
            let doc = document;
            for (const frameSelector of {frames}) {{
                const frame = doc.querySelector(frameSelector);
                if (!frame || !frame.contentDocument) {{
                    return {{ found: false }};
                }}
                doc = frame.contentDocument;
            }}
            const text = {text};
            const el = Array.from(doc.querySelectorAll({selector}))
                .find(e => text === null || (e.textContent || '').includes(text));
            if (!el) {{
                return {{ found: false }};
            }}
            {body}
        }})()
        "#,
        frames = serde_json::to_string(&locator.frames)?,
        selector = serde_json::to_string(&locator.selector)?,
        text = serde_json::to_string(&locator.text)?,
        body = body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_escapes_selectors() {
        let frames = vec![r#"iframe[name="principal2"]"#.to_string()];
        let locator = Locator::new(&frames, "#txt_msg");
        let script = element_script(&locator, "return { found: true };").expect("生成脚本失败");

        assert!(script.contains(r#"["iframe[name=\"principal2\"]"]"#));
        assert!(script.contains(r##"querySelectorAll("#txt_msg")"##));
        assert!(script.contains("const text = null;"));
    }

    #[test]
    fn fill_does_not_commit_field() {
        let body = fill_body("150,00").expect("生成脚本失败");
        assert!(body.contains("el.value = \"150,00\";"));
        assert!(body.contains("new Event('input'"));
        assert!(!body.contains("'change'"));
        assert!(!body.contains("blur"));
    }

    #[test]
    fn tab_commits_field() {
        let body = key_body("Tab").expect("生成脚本失败");
        assert!(body.contains("const key = \"Tab\";"));
        assert!(body.contains("new Event('change'"));
        assert!(body.contains("el.blur();"));
    }

    #[test]
    fn text_filter_is_embedded() {
        let locator = Locator::top("a").with_text("Lançamento Manual");
        let script = element_script(&locator, "return { found: true };").expect("生成脚本失败");
        assert!(script.contains(r#"const text = "Lançamento Manual";"#));
    }
}
