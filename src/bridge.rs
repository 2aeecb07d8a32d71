//! 异步消息桥
//!
//! 签名请求不由引擎直接发出：请求带着随机消息ID发送到桥的另一端，
//! 响应按消息ID找回对应的等待者。每个等待者都有超时，完成或超时后从等待表中移除。

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::error::{LocalizerError, Result};
use crate::transport::{HttpMethod, HttpRequest, Transport};

/// 发往桥另一端的请求
#[derive(Debug, Clone)]
pub struct BridgeRequest {
    pub url: Url,
    pub method: HttpMethod,
    pub data_type: Option<String>,
    pub message_id: String,
}

/// 桥另一端返回的响应
#[derive(Debug, Clone)]
pub struct BridgeResponse {
    pub message_id: String,
    pub is_successful: bool,
    pub data: Option<Value>,
    pub err_message: Option<String>,
}

impl BridgeResponse {
    pub fn success(message_id: impl Into<String>, data: Value) -> Self {
        Self {
            message_id: message_id.into(),
            is_successful: true,
            data: Some(data),
            err_message: None,
        }
    }

    pub fn failure(message_id: impl Into<String>, err_message: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            is_successful: false,
            data: None,
            err_message: Some(err_message.into()),
        }
    }
}

/// 等待表条目守卫，离开作用域时移除条目（包括请求被中途丢弃的情况）
struct PendingGuard<'a> {
    pending: &'a DashMap<String, oneshot::Sender<BridgeResponse>>,
    message_id: String,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.remove(&self.message_id);
    }
}

/// 消息桥
pub struct MessageBridge {
    outbound: mpsc::UnboundedSender<BridgeRequest>,
    pending: DashMap<String, oneshot::Sender<BridgeResponse>>,
    timeout: Duration,
}

impl MessageBridge {
    /// 创建消息桥，返回桥本身和请求的接收端
    pub fn new(timeout: Duration) -> (Arc<Self>, mpsc::UnboundedReceiver<BridgeRequest>) {
        let (outbound, receiver) = mpsc::unbounded_channel();
        let bridge = Arc::new(Self {
            outbound,
            pending: DashMap::new(),
            timeout,
        });
        (bridge, receiver)
    }

    /// 发出请求并等待匹配的响应
    ///
    /// 响应带失败标记时返回 `Transport` 错误；超时未收到响应返回 `Timeout` 错误。
    pub async fn request(&self, url: Url, method: HttpMethod, data_type: Option<&str>) -> Result<Value> {
        let message_id = Uuid::new_v4().simple().to_string();
        let (sender, receiver) = oneshot::channel();
        self.pending.insert(message_id.clone(), sender);
        let _guard = PendingGuard {
            pending: &self.pending,
            message_id: message_id.clone(),
        };

        let request = BridgeRequest {
            url,
            method,
            data_type: data_type.map(str::to_string),
            message_id: message_id.clone(),
        };
        if self.outbound.send(request).is_err() {
            return Err(LocalizerError::Transport("Message bridge is closed".to_string()));
        }
        debug!("已发送桥接请求 {}", message_id);

        let outcome = timeout(self.timeout, receiver).await;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => {
                return Err(LocalizerError::Transport(format!(
                    "Message bridge dropped request {}",
                    message_id
                )))
            }
            Err(_) => {
                warn!("桥接请求 {} 超时", message_id);
                return Err(LocalizerError::Timeout(format!(
                    "No response for message {} within {:?}",
                    message_id, self.timeout
                )));
            }
        };

        if response.is_successful {
            response.data.ok_or_else(|| {
                LocalizerError::Transport(format!("Empty response for message {}", message_id))
            })
        } else {
            Err(LocalizerError::Transport(format!(
                "Translation Request Failed: {}",
                response.err_message.unwrap_or_default()
            )))
        }
    }

    /// 投递响应
    ///
    /// 返回是否有请求在等待该消息ID；无人等待的响应被丢弃。
    pub fn deliver(&self, response: BridgeResponse) -> bool {
        match self.pending.remove(&response.message_id) {
            Some((_, sender)) => sender.send(response).is_ok(),
            None => {
                debug!("丢弃无人等待的响应 {}", response.message_id);
                false
            }
        }
    }

    /// 当前等待中的请求数
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// 启动HTTP转发任务
///
/// 在桥的另一端用 `Transport` 执行请求，并把结果投递回桥。
pub fn spawn_http_relay(
    mut receiver: mpsc::UnboundedReceiver<BridgeRequest>,
    transport: Arc<dyn Transport>,
    bridge: Arc<MessageBridge>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(request) = receiver.recv().await {
            let transport = transport.clone();
            let bridge = bridge.clone();
            tokio::spawn(async move {
                let http_request = HttpRequest {
                    method: request.method,
                    url: request.url,
                    bearer: None,
                    body: None,
                };
                let response = match transport.send(http_request).await {
                    Ok(data) => BridgeResponse::success(request.message_id, data),
                    Err(e) => BridgeResponse::failure(request.message_id, e.to_string()),
                };
                bridge.deliver(response);
            });
        }
    })
}
