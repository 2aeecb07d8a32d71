//! 类型定义模块
//!
//! 定义本地化引擎中使用的枚举、数据结构以及各翻译服务的请求/响应格式。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LocalizerError;

/// 语言
///
/// 引擎只支持中英双语模型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Zh,
}

impl Language {
    /// 翻译源语言：目标语言的另一种
    pub fn opposite(&self) -> Language {
        match self {
            Language::En => Language::Zh,
            Language::Zh => Language::En,
        }
    }
}

/// 设备类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Pc,
    Mobile,
}

/// 显示模式
///
/// * `Replace` - 直接修改选中的节点
/// * `Duplicate` - 先复制节点并平移，在副本上修改
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Replace,
    Duplicate,
}

/// 翻译后是否自动进行样式检查
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoStylelintMode {
    On,
    Off,
}

/// 翻译服务类型
///
/// * `GoogleBasic` - 批量接口，一次请求翻译整批文本
/// * `GoogleFree` - 免费接口，每条文本单独请求
/// * `Baidu` - 签名接口，请求经由消息桥转发
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    GoogleBasic,
    GoogleFree,
    Baidu,
}

macro_rules! wire_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// 存储和传输时使用的名称
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = LocalizerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok($ty::$variant),)+
                    other => Err(LocalizerError::Configuration(format!(
                        "Unsupported {} value: {}",
                        stringify!($ty),
                        other
                    ))),
                }
            }
        }
    };
}

wire_enum!(Language { En => "en", Zh => "zh" });
wire_enum!(DeviceClass { Pc => "pc", Mobile => "mobile" });
wire_enum!(DisplayMode { Replace => "replace", Duplicate => "duplicate" });
wire_enum!(AutoStylelintMode { On => "on", Off => "off" });
wire_enum!(ProviderKind {
    GoogleBasic => "GoogleBasic",
    GoogleFree => "GoogleFree",
    Baidu => "Baidu",
});

/// 字体（字族 + 字重名称）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontName {
    pub family: String,
    pub style: String,
}

impl FontName {
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: style.into(),
        }
    }
}

/// 文本节点当前的排版参数
#[derive(Debug, Clone, PartialEq)]
pub struct TextMetrics {
    pub font: FontName,
    pub font_size: f64,
    pub line_height: f64,
}

/// 处理单元
///
/// 一次运行中每个文本节点对应一个单元，记录该节点是否需要翻译、是否需要样式检查，
/// 以及分发后的翻译结果。单元只在本次运行内有效，不跨运行复用。
#[derive(Debug, Clone)]
pub struct ProcessUnit<N> {
    /// 宿主节点引用
    pub node_ref: N,
    /// 宿主节点ID
    pub node_id: String,
    /// 目标语言
    pub target_language: Language,
    /// 是否需要翻译
    pub needs_translation: bool,
    /// 是否需要样式检查
    pub needs_style_check: bool,
    /// 使用的翻译服务
    pub translation_provider: Option<ProviderKind>,
    /// 分发后填入的翻译结果
    pub translated_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GoogleBasicRequest<'a> {
    pub q: &'a [String],
    pub target: &'a str,
    pub source: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GoogleBasicResponse {
    pub data: GoogleBasicData,
}

#[derive(Debug, Deserialize)]
pub struct GoogleBasicData {
    #[serde(default)]
    pub translations: Vec<GoogleBasicTranslation>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleBasicTranslation {
    #[serde(rename = "translatedText")]
    pub translated_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BaiduResponse {
    pub trans_result: Vec<BaiduSegment>,
}

#[derive(Debug, Deserialize)]
pub struct BaiduSegment {
    pub dst: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub bot_id: &'a str,
    pub user_id: &'a str,
    pub stream: bool,
    pub auto_save_history: bool,
    pub additional_messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
    pub content_type: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct ChatSession {
    pub conversation_id: String,
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatStatus {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub content: String,
}
