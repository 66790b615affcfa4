//! 测试用的内存页面
//!
//! 工具栏按钮的点击根据"上次点击后是否填写过字段"区分打开和保存，
//! 与真实页面共用一个按钮的行为一致。
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use payment_entry_submit::{Config, Locator, PageAutomation, Record};

pub const SUCCESS_42: &str = "Operação realizada com sucesso. Item(s) Pagamento gerado(s) : 42";

#[derive(Debug, Default)]
struct FakeState {
    events: Vec<String>,
    /// 值 → 剩余失败次数
    fill_failures: HashMap<String, usize>,
    /// 每次保存后显示的消息；用完后使用 default_message
    messages: VecDeque<Option<String>>,
    default_message: Option<String>,
    visible_message: Option<String>,
    fills_since_click: usize,
    opens: usize,
    commits: usize,
    captures: Vec<PathBuf>,
    fail_captures: bool,
    login_blocked: bool,
}

pub struct FakePage {
    state: Mutex<FakeState>,
    config: Config,
}

impl FakePage {
    pub fn new(config: &Config) -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
            config: config.clone(),
        }
    }

    /// 每次保存后都显示同一条消息；`None` 表示永远不出现
    pub fn with_default_message(self, message: Option<&str>) -> Self {
        self.state.lock().unwrap().default_message = message.map(str::to_string);
        self
    }

    pub fn with_messages(self, messages: Vec<Option<&str>>) -> Self {
        self.state.lock().unwrap().messages =
            messages.into_iter().map(|m| m.map(str::to_string)).collect();
        self
    }

    /// 填写该值时前 `times` 次失败
    pub fn failing_fill(self, value: &str, times: usize) -> Self {
        self.state
            .lock()
            .unwrap()
            .fill_failures
            .insert(value.to_string(), times);
        self
    }

    pub fn failing_captures(self) -> Self {
        self.state.lock().unwrap().fail_captures = true;
        self
    }

    /// 登录条件永远不满足
    pub fn never_logged_in(self) -> Self {
        self.state.lock().unwrap().login_blocked = true;
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn opens(&self) -> usize {
        self.state.lock().unwrap().opens
    }

    pub fn commits(&self) -> usize {
        self.state.lock().unwrap().commits
    }

    pub fn captures(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().captures.clone()
    }

    fn is_message(&self, locator: &Locator) -> bool {
        locator.selector == self.config.layout.confirmation_message
    }

    fn is_toolbar_button(&self, locator: &Locator) -> bool {
        locator.selector == self.config.layout.new_entry_button
            && locator.frames == self.config.layout.toolbar_frames
    }
}

#[async_trait]
impl PageAutomation for FakePage {
    async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        if let Some(remaining) = state.fill_failures.get_mut(value) {
            if *remaining > 0 {
                *remaining -= 1;
                state.events.push(format!("fill-failed {}={}", locator.selector, value));
                bail!("element not interactable: {}", locator);
            }
        }
        state.fills_since_click += 1;
        state.events.push(format!("fill {}={}", locator.selector, value));
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        if self.is_toolbar_button(locator) {
            if state.fills_since_click == 0 {
                state.opens += 1;
                state.visible_message = None;
                state.events.push("open".to_string());
            } else {
                state.commits += 1;
                let shown = match state.messages.pop_front() {
                    Some(message) => message,
                    None => state.default_message.clone(),
                };
                state.visible_message = shown;
                state.events.push("commit".to_string());
            }
            state.fills_since_click = 0;
        } else {
            state.events.push(format!("click {}", locator));
        }
        Ok(())
    }

    async fn press_key(&self, locator: &Locator, key: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .events
            .push(format!("press {}:{}", locator.selector, key));
        Ok(())
    }

    async fn wait_for_visible(&self, locator: &Locator, _timeout: Duration) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(self.is_message(locator) && state.visible_message.is_some())
    }

    async fn wait_for_attached(&self, locator: &Locator, _timeout: Duration) -> Result<bool> {
        self.state
            .lock()
            .unwrap()
            .events
            .push(format!("attached {}", locator.selector));
        Ok(true)
    }

    async fn text_content(&self, locator: &Locator) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        if self.is_message(locator) {
            return Ok(state.visible_message.clone());
        }
        Ok(None)
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.state.lock().unwrap().events.push(format!("navigate {}", url));
        Ok(())
    }

    async fn wait_for_condition(&self, _predicate: &str, _timeout: Duration) -> Result<bool> {
        Ok(!self.state.lock().unwrap().login_blocked)
    }

    async fn capture_full_page_image(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_captures {
            bail!("screenshot failed");
        }
        state.captures.push(path.to_path_buf());
        Ok(())
    }
}

/// 所有等待为零的测试配置
pub fn fast_config(output_dir: &Path) -> Config {
    Config {
        form_clear_settle_ms: 0,
        field_load_settle_ms: 0,
        success_message_timeout_ms: 0,
        navigation_timeout_ms: 0,
        poll_interval_ms: 0,
        output_dir: output_dir.display().to_string(),
        ..Config::default()
    }
}

pub fn record(line: usize, rubric: &str, provider: &str, amount: &str) -> Record {
    Record::from_cells(
        line,
        &[rubric.to_string(), provider.to_string(), String::new(), amount.to_string()],
    )
}
