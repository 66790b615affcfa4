use std::fmt;

use thiserror::Error;

/// 应用程序错误类型
///
/// 这里只包含会终止整次运行的错误；单条记录的失败由重试循环吸收，
/// 最终体现在 `RecordOutcome` 中。
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入表格不存在
    #[error("输入文件不存在: {path}")]
    InputNotFound { path: String },

    /// 表格读取失败
    #[error("读取表格失败 ({path}): {message}")]
    Spreadsheet { path: String, message: String },

    /// 数据校验失败
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 等待人工登录超时
    #[error("等待人工登录超时 ({timeout_ms} ms)，请确认已正确登录")]
    LoginTimeout { timeout_ms: u64 },

    /// 浏览器相关错误
    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 被中断信号终止
    #[error("运行被中断")]
    Interrupted,

    /// 编排过程中出现的其他错误
    #[error("严重错误: {0:#}")]
    Critical(#[from] anyhow::Error),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 启动浏览器失败
    #[error("启动浏览器失败: {message}")]
    LaunchFailed { message: String },
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed {
        #[source]
        source: chromiumoxide::error::CdpError,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("无法读取配置文件 {path}: {source}")]
    FileUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件格式错误
    #[error("配置文件 {path} 格式错误: {message}")]
    FileInvalid { path: String, message: String },
}

/// 被违反的校验规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    DateFormat,
    MonthYearFormat,
}

/// 单条校验违规
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub line_number: usize,
    pub field: &'static str,
    pub rule: Rule,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule {
            Rule::Required => write!(f, "第 {} 行: {} 为空", self.line_number, self.field),
            Rule::DateFormat => write!(
                f,
                "第 {} 行: {} 必须为 DD/MM/YYYY 格式",
                self.line_number, self.field
            ),
            Rule::MonthYearFormat => write!(
                f,
                "第 {} 行: {} 必须为 MM/YYYY 格式",
                self.line_number, self.field
            ),
        }
    }
}

/// 批量校验错误，包含全部违规项
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("发现 {} 个数据校验错误", violations.len())]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// 每条违规一行
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// 填写表单失败，指明正在填写的字段
#[derive(Debug, Error)]
#[error("填写字段 {field} 失败: {source:#}")]
pub struct FillError {
    pub field: &'static str,
    #[source]
    pub source: anyhow::Error,
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
