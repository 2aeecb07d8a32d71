//! 配置管理模块
//!
//! 提供TOML配置文件的读取、写入和自动发现功能。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::types::DeviceClass;

/// 本地化库配置结构
///
/// 包含节流间隔、翻译服务凭据、润色服务和传输重试等配置，支持从TOML文件加载和保存。
///
/// # 示例
///
/// ```rust,no_run
/// use design_localizer::LocalizerLibConfig;
///
/// // 从默认位置加载配置
/// let config = LocalizerLibConfig::load_from_default_locations();
///
/// // 从指定文件加载配置
/// let config = LocalizerLibConfig::from_file("config.toml").unwrap();
///
/// // 保存配置到文件
/// config.save_to_file("output.toml").unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalizerLibConfig {
    /// 运行参数
    #[serde(default)]
    pub localization: LocalizationConfig,
    /// 翻译服务地址与凭据
    #[serde(default)]
    pub providers: ProviderConfig,
    /// 内容润色服务
    #[serde(default)]
    pub polish: PolishConfig,
    /// 传输层重试策略
    #[serde(default)]
    pub retry: RetryConfig,
}

/// 运行参数
///
/// # 字段说明
///
/// * `device_class` - 排版映射使用的设备类型
/// * `translation_interval_ms` - 翻译请求的最小间隔
/// * `polish_interval_ms` - 润色请求的最小间隔，与翻译节流相互独立
/// * `duplicate_margin` - 复制模式下副本与原节点之间的水平间距
/// * `request_timeout_secs` - 单次HTTP请求超时
/// * `bridge_timeout_secs` - 等待消息桥响应的超时
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizationConfig {
    pub device_class: DeviceClass,
    pub translation_interval_ms: u64,
    pub polish_interval_ms: u64,
    pub duplicate_margin: f64,
    pub request_timeout_secs: u64,
    pub bridge_timeout_secs: u64,
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            device_class: DeviceClass::Pc,
            translation_interval_ms: 100, // 每秒10次
            polish_interval_ms: 6000,     // 每分钟10次
            duplicate_margin: 60.0,
            request_timeout_secs: 30,
            bridge_timeout_secs: 15,
        }
    }
}

/// 翻译服务地址与凭据
///
/// 凭据没有默认值；所选服务缺少凭据时在运行开始前报配置错误。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub google_api_key: Option<String>,
    pub google_basic_url: String,
    pub google_free_url: String,
    pub baidu_url: String,
    pub baidu_app_id: Option<String>,
    pub baidu_secret: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            google_basic_url: "https://translation.googleapis.com/language/translate/v2".to_string(),
            google_free_url: "https://translate.googleapis.com/translate_a/single".to_string(),
            baidu_url: "https://api.fanyi.baidu.com/api/trans/vip/translate".to_string(),
            baidu_app_id: None,
            baidu_secret: None,
        }
    }
}

/// 内容润色服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolishConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub bot_id: Option<String>,
    pub user_id: String,
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
}

impl Default for PolishConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.coze.com".to_string(),
            token: None,
            bot_id: None,
            user_id: "001".to_string(),
            poll_interval_ms: 1000,
            timeout_secs: 15,
        }
    }
}

/// 传输层重试策略
///
/// 只作用于连接失败和5xx响应；引擎本身不重试。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            initial_delay_ms: 100,
            max_delay_ms: 1000,
            backoff_multiplier: 1.2,
        }
    }
}

impl LocalizerLibConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: LocalizerLibConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from multiple possible locations
    ///
    /// 依次尝试 `localizer-config.toml`、`config.toml`、`.localizer-config.toml`，
    /// 都不可用时返回默认配置。
    pub fn load_from_default_locations() -> Self {
        let possible_paths = [
            "localizer-config.toml",
            "config.toml",
            ".localizer-config.toml",
        ];

        for path in &possible_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        info!("已加载配置文件: {}", path);
                        return config;
                    }
                    Err(e) => {
                        warn!("加载配置文件 {} 失败: {}", path, e);
                    }
                }
            }
        }

        info!("未找到配置文件，使用默认配置");
        Self::default()
    }

    /// Generate example configuration file
    ///
    /// 凭据字段写入占位值，方便用户直接替换。
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let mut example = Self::default();
        example.providers.google_api_key = Some("your-google-api-key".to_string());
        example.providers.baidu_app_id = Some("your-baidu-app-id".to_string());
        example.providers.baidu_secret = Some("your-baidu-secret".to_string());
        example.polish.token = Some("your-chat-token".to_string());
        example.polish.bot_id = Some("your-bot-id".to_string());
        example.save_to_file(path)
    }
}
