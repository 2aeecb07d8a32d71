//! 翻译服务适配
//!
//! 三种可互换的翻译服务，统一为按目标语言翻译一批文本、保持顺序和长度的契约：
//!
//! - **GoogleBasic**: 一次请求携带整批文本
//! - **GoogleFree**: 每条文本单独请求，并发发出但都经过同一个分发器
//! - **Baidu**: 签名请求，经由消息桥发出并按消息ID等待响应

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures::future::try_join_all;
use md5::{Digest, Md5};
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use url::Url;

use crate::bridge::MessageBridge;
use crate::config::{LocalizerLibConfig, ProviderConfig};
use crate::error::{LocalizerError, Result};
use crate::transport::{HttpMethod, HttpRequest, Transport};
use crate::translator::Dispatcher;
use crate::types::{BaiduResponse, GoogleBasicRequest, GoogleBasicResponse, Language, ProviderKind};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| LocalizerError::Configuration(format!("Invalid endpoint {}: {}", raw, e)))
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| LocalizerError::Configuration(format!("Missing required setting: {}", name)))
}

/// 批量翻译服务
pub struct GoogleBasicProvider {
    transport: Arc<dyn Transport>,
    endpoint: Url,
}

impl GoogleBasicProvider {
    pub fn new(transport: Arc<dyn Transport>, config: &ProviderConfig) -> Result<Self> {
        let mut endpoint = parse_url(&config.google_basic_url)?;
        endpoint
            .query_pairs_mut()
            .append_pair("key", required(&config.google_api_key, "providers.google_api_key")?);
        Ok(Self { transport, endpoint })
    }

    pub async fn translate_batch(&self, texts: &[String], target: Language, source: Language) -> Result<Vec<String>> {
        let body = serde_json::to_value(GoogleBasicRequest {
            q: texts,
            target: target.as_str(),
            source: source.as_str(),
        })?;
        let response = self
            .transport
            .send(HttpRequest::post(self.endpoint.clone(), body))
            .await
            .map_err(|e| e.with_context("Failed to translate by Google Basic"))?;
        parse_google_basic(response, texts.len())
    }
}

/// 缺失的译文以空字符串补齐，保证与输入等长
fn parse_google_basic(response: Value, expected: usize) -> Result<Vec<String>> {
    let parsed: GoogleBasicResponse = serde_json::from_value(response)?;
    let mut results: Vec<String> = parsed
        .data
        .translations
        .into_iter()
        .map(|t| t.translated_text.unwrap_or_default())
        .collect();
    if results.len() != expected {
        warn!("译文数量 {} 与原文数量 {} 不一致", results.len(), expected);
    }
    results.resize(expected, String::new());
    Ok(results)
}

/// 免费翻译服务
pub struct GoogleFreeProvider {
    transport: Arc<dyn Transport>,
    endpoint: Url,
}

impl GoogleFreeProvider {
    pub fn new(transport: Arc<dyn Transport>, config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            transport,
            endpoint: parse_url(&config.google_free_url)?,
        })
    }

    pub async fn translate_one(&self, text: &str, target: Language, source: Language) -> Result<String> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client", "gtx")
            .append_pair("dt", "t")
            .append_pair("sl", source.as_str())
            .append_pair("tl", target.as_str())
            .append_pair("q", text);

        let response = self
            .transport
            .send(HttpRequest::get(url))
            .await
            .map_err(|e| e.with_context("Failed to translate by Google Free"))?;
        parse_google_free(&response)
    }
}

/// 响应形如 `[[["译文片段", "原文片段", ...], ...], ...]`，拼接每个片段的第一个元素
fn parse_google_free(response: &Value) -> Result<String> {
    let segments = response
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| LocalizerError::Transport("Unexpected Google Free response shape".to_string()))?;
    Ok(segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect())
}

/// 签名翻译服务
pub struct BaiduProvider {
    bridge: Arc<MessageBridge>,
    endpoint: Url,
    app_id: String,
    secret: String,
}

impl BaiduProvider {
    pub fn new(bridge: Arc<MessageBridge>, config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            bridge,
            endpoint: parse_url(&config.baidu_url)?,
            app_id: required(&config.baidu_app_id, "providers.baidu_app_id")?.to_string(),
            secret: required(&config.baidu_secret, "providers.baidu_secret")?.to_string(),
        })
    }

    pub async fn translate_batch(&self, texts: &[String], target: Language, source: Language) -> Result<Vec<String>> {
        let query = texts.join("\n");
        let salt = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
            .to_string();
        let sign = sign_request(&self.app_id, &query, &salt, &self.secret);

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("from", source.as_str())
            .append_pair("to", target.as_str())
            .append_pair("appid", &self.app_id)
            .append_pair("salt", &salt)
            .append_pair("sign", &sign);

        let response = self
            .bridge
            .request(url, HttpMethod::Get, Some("jsonp"))
            .await
            .map_err(|e| e.with_context("Failed to translate by Baidu"))?;
        regroup_lines(texts, parse_baidu(response)?)
    }
}

/// 签名：`md5(appid + q + salt + secret)` 的小写十六进制
pub fn sign_request(app_id: &str, query: &str, salt: &str, secret: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(app_id.as_bytes());
    hasher.update(query.as_bytes());
    hasher.update(salt.as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn parse_baidu(response: Value) -> Result<Vec<String>> {
    if let Some(code) = response.get("error_code") {
        let message = response.get("error_msg").and_then(Value::as_str).unwrap_or_default();
        return Err(LocalizerError::Transport(format!("Baidu error {}: {}", code, message)));
    }
    let parsed: BaiduResponse = serde_json::from_value(response)?;
    Ok(parsed.trans_result.into_iter().map(|segment| segment.dst).collect())
}

/// 接口按行返回结果；按每条原文的行数把结果重新分组
fn regroup_lines(texts: &[String], lines: Vec<String>) -> Result<Vec<String>> {
    let expected: usize = texts.iter().map(|t| t.split('\n').count()).sum();
    if lines.len() != expected {
        return Err(LocalizerError::Transport(format!(
            "Expected {} translated lines, got {}",
            expected,
            lines.len()
        )));
    }

    let mut lines = lines.into_iter();
    Ok(texts
        .iter()
        .map(|text| {
            let count = text.split('\n').count();
            lines.by_ref().take(count).collect::<Vec<_>>().join("\n")
        })
        .collect())
}

/// 翻译服务
///
/// 按 `ProviderKind` 构建，分发时穷举匹配。
pub enum TranslationProvider {
    GoogleBasic(GoogleBasicProvider),
    GoogleFree(GoogleFreeProvider),
    Baidu(BaiduProvider),
}

impl TranslationProvider {
    /// 根据配置构建翻译服务
    ///
    /// 缺少凭据、地址非法或签名服务没有可用的消息桥时返回配置错误。
    pub fn from_config(
        kind: ProviderKind,
        config: &LocalizerLibConfig,
        transport: Arc<dyn Transport>,
        bridge: Option<Arc<MessageBridge>>,
    ) -> Result<Self> {
        let providers = &config.providers;
        Ok(match kind {
            ProviderKind::GoogleBasic => Self::GoogleBasic(GoogleBasicProvider::new(transport, providers)?),
            ProviderKind::GoogleFree => Self::GoogleFree(GoogleFreeProvider::new(transport, providers)?),
            ProviderKind::Baidu => {
                let bridge = bridge.ok_or_else(|| {
                    LocalizerError::Configuration("Baidu provider requires a message bridge".to_string())
                })?;
                Self::Baidu(BaiduProvider::new(bridge, providers)?)
            }
        })
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::GoogleBasic(_) => ProviderKind::GoogleBasic,
            Self::GoogleFree(_) => ProviderKind::GoogleFree,
            Self::Baidu(_) => ProviderKind::Baidu,
        }
    }

    /// 翻译一批文本
    ///
    /// 输出与输入顺序一致、长度相同。源语言固定为目标语言的另一种。
    /// 逐条翻译时任意一条失败则整批失败。
    pub async fn translate(&self, texts: &[String], target: Language, dispatcher: &Dispatcher) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let source = target.opposite();
        info!("使用 {} 翻译 {} 条文本 ({} -> {})", self.kind(), texts.len(), source, target);

        match self {
            Self::GoogleBasic(provider) => {
                dispatcher
                    .dispatch(|| provider.translate_batch(texts, target, source))
                    .await
            }
            Self::GoogleFree(provider) => {
                let calls = texts.iter().map(|text| {
                    dispatcher.dispatch(move || provider.translate_one(text, target, source))
                });
                try_join_all(calls).await
            }
            Self::Baidu(provider) => {
                dispatcher
                    .dispatch(|| provider.translate_batch(texts, target, source))
                    .await
            }
        }
    }
}

/// 检测批量翻译接口是否可用
///
/// 5秒内未返回或返回任何错误都视为不可用。
pub async fn probe_google_basic(transport: &dyn Transport, config: &ProviderConfig) -> bool {
    let Some(key) = config.google_api_key.as_deref() else {
        return false;
    };
    let Ok(mut url) = parse_url(&config.google_basic_url) else {
        return false;
    };
    url.query_pairs_mut()
        .append_pair("key", key)
        .append_pair("q", "test")
        .append_pair("target", "zh");

    match timeout(PROBE_TIMEOUT, transport.send(HttpRequest::get(url))).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!("批量翻译接口不可用: {}", e);
            false
        }
        Err(_) => {
            debug!("批量翻译接口检测超时");
            false
        }
    }
}
