//! 用户设置模块
//!
//! 设置由外部存储持有（跨会话保留的键值对），引擎只在每次运行开始时读取一次快照。

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use tracing::debug;

use crate::error::{LocalizerError, Result};
use crate::types::{AutoStylelintMode, DisplayMode, Language, ProviderKind};

/// 设置键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    TargetLanguage,
    DisplayMode,
    AutoStylelintMode,
    TranslationProvider,
    IsFirstOpen,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::TargetLanguage,
        SettingKey::DisplayMode,
        SettingKey::AutoStylelintMode,
        SettingKey::TranslationProvider,
        SettingKey::IsFirstOpen,
    ];

    /// 存储中使用的键名
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::TargetLanguage => "targetLanguage",
            SettingKey::DisplayMode => "displayMode",
            SettingKey::AutoStylelintMode => "autoStylelintMode",
            SettingKey::TranslationProvider => "translationProvider",
            SettingKey::IsFirstOpen => "isFirstOpen",
        }
    }

    /// 未写入时的默认值
    pub fn default_value(&self) -> &'static str {
        match self {
            SettingKey::TargetLanguage => Language::En.as_str(),
            SettingKey::DisplayMode => DisplayMode::Duplicate.as_str(),
            SettingKey::AutoStylelintMode => AutoStylelintMode::On.as_str(),
            SettingKey::TranslationProvider => ProviderKind::GoogleBasic.as_str(),
            SettingKey::IsFirstOpen => "true",
        }
    }

    /// 按键的类型校验取值
    fn validate(&self, value: &str) -> Result<()> {
        match self {
            SettingKey::TargetLanguage => value.parse::<Language>().map(|_| ()),
            SettingKey::DisplayMode => value.parse::<DisplayMode>().map(|_| ()),
            SettingKey::AutoStylelintMode => value.parse::<AutoStylelintMode>().map(|_| ()),
            SettingKey::TranslationProvider => value.parse::<ProviderKind>().map(|_| ()),
            SettingKey::IsFirstOpen => parse_bool(value).map(|_| ()),
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    value
        .parse::<bool>()
        .map_err(|_| LocalizerError::Configuration(format!("Unsupported boolean value: {}", value)))
}

/// 设置存储
///
/// 由宿主提供的持久化键值存储，引擎不对其加锁。
pub trait SettingsStore: Send + Sync {
    fn read(&self, key: SettingKey) -> Result<Option<String>>;
    fn write(&self, key: SettingKey, value: &str) -> Result<()>;
}

/// 内存设置存储
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: DashMap<SettingKey, String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn read(&self, key: SettingKey) -> Result<Option<String>> {
        Ok(self.values.get(&key).map(|v| v.value().clone()))
    }

    fn write(&self, key: SettingKey, value: &str) -> Result<()> {
        self.values.insert(key, value.to_string());
        Ok(())
    }
}

/// 文件设置存储
///
/// 以TOML表的形式保存在磁盘上，每次写入都会重写整个文件。
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    values: DashMap<String, String>,
}

impl FileSettingsStore {
    /// 打开设置文件，文件不存在时从空设置开始
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = DashMap::new();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let table: BTreeMap<String, String> = toml::from_str(&content)?;
            for (key, value) in table {
                values.insert(key, value);
            }
        }
        Ok(Self { path, values })
    }

    fn persist(&self) -> Result<()> {
        let table: BTreeMap<String, String> = self
            .values
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        fs::write(&self.path, toml::to_string_pretty(&table)?)?;
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn read(&self, key: SettingKey) -> Result<Option<String>> {
        Ok(self.values.get(key.as_str()).map(|v| v.value().clone()))
    }

    fn write(&self, key: SettingKey, value: &str) -> Result<()> {
        self.values.insert(key.as_str().to_string(), value.to_string());
        self.persist()
    }
}

/// 设置快照
///
/// 在运行开始时读取一次，显式传给编排器，运行之间不缓存。
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub target_language: Language,
    pub display_mode: DisplayMode,
    pub auto_stylelint_mode: AutoStylelintMode,
    pub translation_provider: ProviderKind,
    pub is_first_open: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_language: Language::En,
            display_mode: DisplayMode::Duplicate,
            auto_stylelint_mode: AutoStylelintMode::On,
            translation_provider: ProviderKind::GoogleBasic,
            is_first_open: true,
        }
    }
}

impl Settings {
    /// 从存储读取全部设置并应用默认值
    pub fn load(store: &dyn SettingsStore) -> Result<Self> {
        let settings = Self {
            target_language: read_setting(store, SettingKey::TargetLanguage)?.parse()?,
            display_mode: read_setting(store, SettingKey::DisplayMode)?.parse()?,
            auto_stylelint_mode: read_setting(store, SettingKey::AutoStylelintMode)?.parse()?,
            translation_provider: read_setting(store, SettingKey::TranslationProvider)?.parse()?,
            is_first_open: parse_bool(&read_setting(store, SettingKey::IsFirstOpen)?)?,
        };
        debug!("读取设置快照: {:?}", settings);
        Ok(settings)
    }
}

/// 读取单个设置，未写入时返回默认值
pub fn read_setting(store: &dyn SettingsStore, key: SettingKey) -> Result<String> {
    Ok(store
        .read(key)?
        .unwrap_or_else(|| key.default_value().to_string()))
}

/// 修改单个设置，写入前按键的类型校验
pub fn change_setting(store: &dyn SettingsStore, key: SettingKey, value: &str) -> Result<()> {
    key.validate(value)?;
    debug!("写入设置 {} = {}", key, value);
    store.write(key, value)
}
