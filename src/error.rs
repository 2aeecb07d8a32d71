//! 错误处理模块
//!
//! 定义本地化引擎中使用的错误类型和错误处理机制。

use std::fmt;

use thiserror::Error;

/// 本地化错误类型
///
/// 包含一次本地化运行中可能出现的各种错误情况。
///
/// # 变体说明
///
/// * `Configuration` - 未知翻译服务、缺少必需配置或设置值非法，立即终止运行
/// * `Transport` - 响应体格式错误、桥接请求失败
/// * `Http` - 非2xx响应，与 `Transport` 同属传输类错误
/// * `Connection` - 无法建立连接
/// * `Timeout` - 等待响应超时（包括签名请求的关联超时）
/// * `InvalidInput` - 输入校验失败
/// * `Host` - 宿主节点树操作失败（如节点引用已失效）
/// * `Settings` - 设置存储读写失败
/// * `Cancelled` - 运行被取消
/// * `Context` - 附带上下文标签的包装错误
#[derive(Debug, Error)]
pub enum LocalizerError {
    /// 配置错误
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// 传输错误
    #[error("Transport error: {0}")]
    Transport(String),
    /// 服务返回非2xx状态码
    #[error("HTTP error {status}: {message}")]
    Http {
        /// 状态码
        status: u16,
        /// 响应内容
        message: String,
    },
    /// 连接失败
    #[error("Connection error: {0}")]
    Connection(String),
    /// 超时错误
    #[error("Timed out: {0}")]
    Timeout(String),
    /// 输入无效
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// 宿主节点树错误
    #[error("Host error: {0}")]
    Host(String),
    /// 设置存储错误
    #[error("Settings error: {0}")]
    Settings(String),
    /// 运行被取消
    #[error("Run cancelled")]
    Cancelled,
    /// 带上下文的错误
    #[error("{context} - {source}")]
    Context {
        /// 上下文标签
        context: String,
        /// 原始错误
        #[source]
        source: Box<LocalizerError>,
    },
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Validation,
    Host,
    Cancelled,
}

impl LocalizerError {
    /// 为错误附加上下文标签
    pub fn with_context<T: fmt::Display>(self, context: T) -> Self {
        LocalizerError::Context {
            context: context.to_string(),
            source: Box::new(self),
        }
    }

    /// 获取错误类别，穿透所有上下文包装
    pub fn kind(&self) -> ErrorKind {
        match self {
            LocalizerError::Configuration(_) | LocalizerError::Settings(_) => ErrorKind::Configuration,
            LocalizerError::Transport(_)
            | LocalizerError::Http { .. }
            | LocalizerError::Connection(_)
            | LocalizerError::Timeout(_) => ErrorKind::Transport,
            LocalizerError::InvalidInput(_) => ErrorKind::Validation,
            LocalizerError::Host(_) => ErrorKind::Host,
            LocalizerError::Cancelled => ErrorKind::Cancelled,
            LocalizerError::Context { source, .. } => source.kind(),
        }
    }

    /// 是否为致命错误
    ///
    /// 只有校验类问题可以降级处理，其余错误都会终止当前运行。
    pub fn is_fatal(&self) -> bool {
        self.kind() != ErrorKind::Validation
    }

    /// 传输层是否值得重试
    pub(crate) fn is_retryable(&self) -> bool {
        match self {
            LocalizerError::Timeout(_) | LocalizerError::Connection(_) => true,
            LocalizerError::Http { status, .. } => *status >= 500,
            LocalizerError::Context { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for LocalizerError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            LocalizerError::Timeout(error.to_string())
        } else if error.is_connect() {
            LocalizerError::Connection(error.to_string())
        } else {
            LocalizerError::Transport(error.to_string())
        }
    }
}

impl From<serde_json::Error> for LocalizerError {
    fn from(error: serde_json::Error) -> Self {
        LocalizerError::Transport(format!("Malformed response body: {}", error))
    }
}

impl From<toml::de::Error> for LocalizerError {
    fn from(error: toml::de::Error) -> Self {
        LocalizerError::Configuration(format!("TOML parse error: {}", error))
    }
}

impl From<toml::ser::Error> for LocalizerError {
    fn from(error: toml::ser::Error) -> Self {
        LocalizerError::Configuration(format!("TOML serialize error: {}", error))
    }
}

impl From<std::io::Error> for LocalizerError {
    fn from(error: std::io::Error) -> Self {
        LocalizerError::Settings(format!("IO error: {}", error))
    }
}

impl From<tokio::time::error::Elapsed> for LocalizerError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        LocalizerError::Timeout(error.to_string())
    }
}

/// 本地化结果类型别名
///
/// 简化返回类型，使用 `LocalizerError` 作为错误类型。
///
/// # 示例
///
/// ```rust
/// use design_localizer::{Result, LocalizerError};
///
/// fn example_function() -> Result<String> {
///     Err(LocalizerError::InvalidInput("empty".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, LocalizerError>;
