//! 程序配置
//!
//! 配置只在启动时构建一次，之后以不可变引用传给各个组件。
//! 优先级：内置默认值 < TOML 配置文件 < 环境变量

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ConfigError};

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 导航 / 元素附着的默认超时（毫秒）
    pub navigation_timeout_ms: u64,
    /// 每条记录的最大尝试次数
    pub max_attempts: u32,
    /// 等待确认消息出现的超时（毫秒）
    pub success_message_timeout_ms: u64,
    /// 点击"新增"后等待表单清空的固定时长（毫秒）
    pub form_clear_settle_ms: u64,
    /// 查找类字段提交后等待服务端联动的固定时长（毫秒）
    pub field_load_settle_ms: u64,
    /// 等待人工登录的超时（毫秒）
    pub login_timeout_ms: u64,
    /// 轮询页面状态的间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 输入表格路径
    pub input_file: String,
    /// 是否跳过第一行（表头）
    pub skip_header: bool,
    /// 报告、截图和错误日志的输出目录
    pub output_dir: String,
    /// 运行日志文件
    pub output_log_file: String,
    /// 浏览器调试端口；设置后连接已有浏览器，否则启动新浏览器
    pub browser_debug_port: Option<u16>,
    /// 浏览器可执行文件路径
    pub chrome_executable: Option<String>,
    /// 是否无头运行（人工登录时必须为 false）
    pub headless: bool,
    /// 开始前的倒计时（秒）
    pub start_delay_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 登录页
    pub login_url: String,
    /// 注销地址
    pub logoff_url: String,
    /// 页面结构描述
    pub layout: PageLayout,
}

/// 页面结构描述：frame 链、元素选择器、菜单文字
///
/// 目标系统把表单和工具栏放在两层嵌套 iframe 中，
/// 这里把这些环境细节集中起来，核心逻辑只通过它定位元素。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    /// 工具栏所在的 frame 链（由外到内）
    pub toolbar_frames: Vec<String>,
    /// "新增/保存"按钮（同一个控件）
    pub new_entry_button: String,
    /// 表单所在的 frame 链
    pub form_frames: Vec<String>,
    pub rubric_code_field: String,
    pub provider_code_field: String,
    pub period_ref_field: String,
    pub gross_amount_field: String,
    pub expected_payment_date_field: String,
    pub notes_field: String,
    /// 确认消息元素
    pub confirmation_message: String,
    /// 确认消息中表示成功的短语
    pub success_marker: String,
    /// 菜单链接文字（按顺序点击）
    pub menu_links: Vec<String>,
    /// 登录完成判断（页面内 JS 表达式）
    pub login_detected_predicate: String,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            toolbar_frames: vec![
                "#iframeasp".to_string(),
                r#"iframe[name="toolbarMvcToAsp"]"#.to_string(),
            ],
            new_entry_button: r#"img[alt="Incluir"], img[title="Incluir"]"#.to_string(),
            form_frames: vec![
                "#iframeasp".to_string(),
                r#"iframe[name="principal2"]"#.to_string(),
            ],
            rubric_code_field: "#cod_tipo_rubrica".to_string(),
            provider_code_field: "#cod_prestador".to_string(),
            period_ref_field: "#mes_ano_ref".to_string(),
            gross_amount_field: "#val_bruto".to_string(),
            expected_payment_date_field: "#dt_pgto_prevista".to_string(),
            notes_field: "#txt_obs_lm".to_string(),
            confirmation_message: "#txt_msg".to_string(),
            success_marker: "Operação realizada com sucesso".to_string(),
            menu_links: vec!["Pagamento".to_string(), "Lançamento Manual".to_string()],
            login_detected_predicate: "window.location.href.includes('/Home') \
                || window.location.href.includes('/Dashboard') \
                || !window.location.href.includes('/Account/Login')"
                .to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 30_000,
            max_attempts: 3,
            success_message_timeout_ms: 15_000,
            form_clear_settle_ms: 3_000,
            field_load_settle_ms: 4_000,
            login_timeout_ms: 120_000,
            poll_interval_ms: 250,
            input_file: "dados_lancamento.xlsx".to_string(),
            skip_header: false,
            output_dir: ".".to_string(),
            output_log_file: "output.txt".to_string(),
            browser_debug_port: None,
            chrome_executable: None,
            headless: false,
            start_delay_secs: 5,
            verbose_logging: false,
            login_url: "https://unimedcerrado.topsaude.com.br/TSNMVC/Account/Login".to_string(),
            logoff_url:
                "https://unimedcerrado.topsaude.com.br/TSNMVC/TSNMVC/Account/Login?ssoUserLogon=S"
                    .to_string(),
            layout: PageLayout::default(),
        }
    }
}

/// 写入报告的配置快照
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub navigation_timeout_ms: u64,
    pub max_attempts: u32,
    pub success_message_timeout_ms: u64,
    pub form_clear_settle_ms: u64,
    pub field_load_settle_ms: u64,
}

impl Config {
    /// 加载配置：默认值 → 配置文件 → 环境变量
    pub fn load() -> Result<Self, AppError> {
        let path =
            std::env::var("PAYMENT_ENTRY_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        let base = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        base.with_env_overrides()
    }

    /// 从 TOML 文件读取，缺省项使用默认值
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileUnreadable {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| {
            AppError::Config(ConfigError::FileInvalid {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖
    pub fn with_env_overrides(mut self) -> Result<Self, AppError> {
        override_parsed("NAVIGATION_TIMEOUT_MS", &mut self.navigation_timeout_ms)?;
        override_parsed("MAX_ATTEMPTS", &mut self.max_attempts)?;
        override_parsed("SUCCESS_MESSAGE_TIMEOUT_MS", &mut self.success_message_timeout_ms)?;
        override_parsed("FORM_CLEAR_SETTLE_MS", &mut self.form_clear_settle_ms)?;
        override_parsed("FIELD_LOAD_SETTLE_MS", &mut self.field_load_settle_ms)?;
        override_parsed("LOGIN_TIMEOUT_MS", &mut self.login_timeout_ms)?;
        override_parsed("START_DELAY_SECS", &mut self.start_delay_secs)?;
        override_parsed("HEADLESS", &mut self.headless)?;
        override_parsed("VERBOSE_LOGGING", &mut self.verbose_logging)?;

        if let Ok(v) = std::env::var("BROWSER_DEBUG_PORT") {
            self.browser_debug_port = Some(parse_env("BROWSER_DEBUG_PORT", &v)?);
        }
        if let Ok(v) = std::env::var("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(v);
        }
        self.input_file = std::env::var("INPUT_FILE").unwrap_or(self.input_file);
        self.output_dir = std::env::var("OUTPUT_DIR").unwrap_or(self.output_dir);
        self.login_url = std::env::var("LOGIN_URL").unwrap_or(self.login_url);
        self.logoff_url = std::env::var("LOGOFF_URL").unwrap_or(self.logoff_url);

        if self.max_attempts == 0 {
            return Err(ConfigError::EnvVarParseFailed {
                var_name: "MAX_ATTEMPTS".to_string(),
                value: "0".to_string(),
                expected_type: "正整数".to_string(),
            }
            .into());
        }
        Ok(self)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn success_message_timeout(&self) -> Duration {
        Duration::from_millis(self.success_message_timeout_ms)
    }

    pub fn form_clear_settle(&self) -> Duration {
        Duration::from_millis(self.form_clear_settle_ms)
    }

    pub fn field_load_settle(&self) -> Duration {
        Duration::from_millis(self.field_load_settle_ms)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_millis(self.login_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        Path::new(&self.output_dir).join(file_name)
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            navigation_timeout_ms: self.navigation_timeout_ms,
            max_attempts: self.max_attempts,
            success_message_timeout_ms: self.success_message_timeout_ms,
            form_clear_settle_ms: self.form_clear_settle_ms,
            field_load_settle_ms: self.field_load_settle_ms,
        }
    }
}

fn override_parsed<T: std::str::FromStr>(var_name: &str, target: &mut T) -> Result<(), AppError> {
    if let Ok(v) = std::env::var(var_name) {
        *target = parse_env(var_name, &v)?;
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(var_name: &str, value: &str) -> Result<T, AppError> {
    value.trim().parse().map_err(|_| {
        ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type: std::any::type_name::<T>().to_string(),
        }
        .into()
    })
}
