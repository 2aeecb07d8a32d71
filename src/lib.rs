//! # Design Localizer
//!
//! 面向设计工具的批量本地化引擎：把选中节点树里的文本翻译成目标语言，
//! 按语言习惯格式化日期、月份和标题，并把字体映射到目标语言/设备的规范排版。
//!
//! ## 主要特性
//!
//! - **多翻译服务**: 批量接口、逐条接口和经由消息桥的签名接口可互换
//! - **速率限制**: 每次运行一个新的分发器，翻译与润色各自节流
//! - **语言格式化**: 日期、星期、月份缩写和标题大小写规则
//! - **排版映射**: 按字重、字号、行高、语言和设备查找规范字体
//! - **内容润色**: 基于对话接口的异步润色
//! - **配置灵活**: 支持TOML配置文件和程序化配置
//!
//! ## 快速开始
//!
//! ```rust
//! use design_localizer::{format_content, needs_translation, Language};
//!
//! assert!(needs_translation("你好", Language::En));
//! assert_eq!(format_content("2024/03/05", Language::En, ""), "Mar 5, 2024");
//! assert_eq!(format_content("create new project", Language::En, "Button-text"), "Create New Project");
//! ```
//!
//! ## 配置文件支持
//!
//! ```toml
//! [localization]
//! device_class = "pc"
//! translation_interval_ms = 100
//! polish_interval_ms = 6000
//!
//! [providers]
//! google_api_key = "your-key"
//! baidu_app_id = "your-app-id"
//! baidu_secret = "your-secret"
//!
//! [polish]
//! token = "your-token"
//! bot_id = "your-bot"
//! ```

pub mod bridge;
pub mod collector;
pub mod config;
pub mod error;
pub mod formatter;
pub mod gate;
pub mod host;
pub mod orchestrator;
pub mod polisher;
pub mod provider;
pub mod settings;
pub mod translator;
pub mod transport;
pub mod types;
pub mod typography;

pub use bridge::{spawn_http_relay, BridgeRequest, BridgeResponse, MessageBridge};
pub use collector::collect_units;
pub use config::{LocalizationConfig, LocalizerLibConfig, PolishConfig, ProviderConfig, RetryConfig};
pub use error::{ErrorKind, LocalizerError, Result};
pub use formatter::format_content;
pub use gate::needs_translation;
pub use host::{Bounds, HostTree, NodeKind, SceneContent, SceneTree};
pub use orchestrator::{Command, Localizer, RunReport, RunState};
pub use polisher::{needs_polishing, Polisher};
pub use provider::{probe_google_basic, TranslationProvider};
pub use settings::{
    change_setting, read_setting, FileSettingsStore, MemorySettingsStore, SettingKey, Settings, SettingsStore,
};
pub use translator::{Dispatcher, RateLimiter};
pub use transport::{retry_with_backoff, HttpMethod, HttpRequest, ReqwestTransport, Transport};
pub use types::{
    AutoStylelintMode, DeviceClass, DisplayMode, FontName, Language, ProcessUnit, ProviderKind, TextMetrics,
};
pub use typography::{resolve_font, resolve_style_key};
