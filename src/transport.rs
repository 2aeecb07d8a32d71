//! 网络传输模块
//!
//! 翻译服务通过 `Transport` 能力发出请求；生产实现基于 reqwest，测试中可替换为内存实现。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use crate::config::RetryConfig;
use crate::error::{LocalizerError, Result};

/// 请求方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// 一次HTTP请求
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            bearer: None,
            body: None,
        }
    }

    pub fn post(url: Url, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            bearer: None,
            body: Some(body),
        }
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// 传输能力
///
/// 成功时返回解析后的JSON；非2xx响应和无法解析的响应体都是 `Transport` 错误。
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<Value>;
}

/// 带指数退避的重试机制
///
/// 只重试连接失败、超时和5xx响应；其他错误立即返回。
pub async fn retry_with_backoff<F, Fut, T>(mut operation: F, config: &RetryConfig) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut delay = config.initial_delay_ms;
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt >= config.max_retries || !e.is_retryable() => return Err(e),
            Err(e) => {
                attempt += 1;
                warn!("第 {} 次请求失败: {}，{}ms 后重试", attempt, e, delay);
                sleep(Duration::from_millis(delay)).await;
                delay = std::cmp::min(
                    (delay as f64 * config.backoff_multiplier) as u64,
                    config.max_delay_ms,
                );
            }
        }
    }
}

/// 基于 reqwest 的传输实现
#[derive(Clone)]
pub struct ReqwestTransport {
    /// HTTP客户端
    client: Client,
    /// 重试策略
    retry: RetryConfig,
}

impl ReqwestTransport {
    /// 创建传输实例
    ///
    /// # 参数
    ///
    /// * `timeout` - 单次请求超时
    /// * `retry` - 连接失败和5xx响应的重试策略
    pub fn new(timeout: Duration, retry: RetryConfig) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|e| {
                warn!("创建HTTP客户端失败: {}，使用默认客户端", e);
                Client::new()
            });

        Self { client, retry }
    }

    async fn send_once(&self, request: &HttpRequest) -> Result<Value> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(request.url.clone()),
            HttpMethod::Post => self.client.post(request.url.clone()),
        };
        builder = builder.header("Accept", "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;

        let status = response.status();
        debug!("{} 响应状态: {}", request.url.path(), status);
        let text = response.text().await?;

        if !status.is_success() {
            return Err(LocalizerError::Http {
                status: status.as_u16(),
                message: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<Value> {
        retry_with_backoff(|| self.send_once(&request), &self.retry).await
    }
}
