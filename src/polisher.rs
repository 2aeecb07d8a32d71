//! 内容润色模块
//!
//! 通过对话接口润色文本：创建会话 → 轮询状态 → 读取回复。
//! 润色请求使用独立的分发器，节流间隔与翻译互不影响。

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::{sleep, timeout};
use tracing::{debug, info};
use url::Url;

use crate::config::{LocalizerLibConfig, PolishConfig};
use crate::error::{LocalizerError, Result};
use crate::transport::{HttpRequest, Transport};
use crate::translator::Dispatcher;
use crate::types::{ChatEnvelope, ChatMessage, ChatReply, ChatRequest, ChatSession, ChatStatus, Language};

static ENGLISH_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-zA-Z]+\b").expect("english word pattern"));

/// 英文单词数与中文字符数之和大于5时才值得润色
pub fn needs_polishing(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let words = ENGLISH_WORD.find_iter(text).count();
    let chars = text.chars().filter(|c| ('\u{4e00}'..='\u{9fa5}').contains(c)).count();
    words + chars > 5
}

fn prompt_for(target: Language) -> &'static str {
    match target {
        Language::Zh => "润色以下文本: ",
        Language::En => "Polish following content: ",
    }
}

/// 内容润色器
pub struct Polisher {
    transport: Arc<dyn Transport>,
    config: PolishConfig,
    token: String,
    bot_id: String,
    dispatcher: Dispatcher,
}

impl Polisher {
    /// 创建润色器，缺少令牌或机器人ID时返回配置错误
    pub fn new(transport: Arc<dyn Transport>, config: &LocalizerLibConfig) -> Result<Self> {
        let polish = config.polish.clone();
        let token = polish
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LocalizerError::Configuration("Missing required setting: polish.token".to_string()))?;
        let bot_id = polish
            .bot_id
            .clone()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| LocalizerError::Configuration("Missing required setting: polish.bot_id".to_string()))?;

        Ok(Self {
            transport,
            dispatcher: Dispatcher::for_polishing(Duration::from_millis(config.localization.polish_interval_ms)),
            config: polish,
            token,
            bot_id,
        })
    }

    /// 润色一段文本
    pub async fn polish(&self, content: &str, target: Language) -> Result<String> {
        if content.is_empty() {
            return Err(LocalizerError::InvalidInput(
                "Content and target language must be provided".to_string(),
            ));
        }
        let prompt = format!("{}{}", prompt_for(target), content);
        self.dispatcher.dispatch(|| self.run_chat(&prompt)).await
    }

    async fn run_chat(&self, prompt: &str) -> Result<String> {
        let session = self.create_chat(prompt).await?;
        debug!("已创建会话 {} / {}", session.conversation_id, session.id);

        let poll = async {
            loop {
                if self.is_chat_complete(&session).await? {
                    return Ok::<_, LocalizerError>(());
                }
                sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
            }
        };
        timeout(Duration::from_secs(self.config.timeout_secs), poll)
            .await
            .map_err(|_| LocalizerError::Timeout(format!("Chat {} did not complete", session.id)))??;

        let reply = self.fetch_chat_result(&session).await?;
        info!("润色完成，{} 字符", reply.chars().count());
        Ok(reply)
    }

    fn endpoint(&self, path: &str, session: Option<&ChatSession>) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_base)
            .and_then(|base| base.join(path))
            .map_err(|e| LocalizerError::Configuration(format!("Invalid polish endpoint: {}", e)))?;
        if let Some(session) = session {
            url.query_pairs_mut()
                .append_pair("conversation_id", &session.conversation_id)
                .append_pair("chat_id", &session.id);
        }
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let value = self.transport.send(request.bearer(self.token.clone())).await?;
        let envelope: ChatEnvelope<T> = serde_json::from_value(value)?;
        Ok(envelope.data)
    }

    async fn create_chat(&self, content: &str) -> Result<ChatSession> {
        let body = serde_json::to_value(ChatRequest {
            bot_id: &self.bot_id,
            user_id: &self.config.user_id,
            stream: false,
            auto_save_history: true,
            additional_messages: vec![ChatMessage {
                role: "user",
                content,
                content_type: "text",
            }],
        })?;
        self.call(HttpRequest::post(self.endpoint("/v3/chat", None)?, body)).await
    }

    async fn is_chat_complete(&self, session: &ChatSession) -> Result<bool> {
        let status: ChatStatus = self
            .call(HttpRequest::get(self.endpoint("/v3/chat/retrieve", Some(session))?))
            .await?;
        Ok(status.status == "completed")
    }

    async fn fetch_chat_result(&self, session: &ChatSession) -> Result<String> {
        let messages: Vec<Value> = self
            .call(HttpRequest::get(self.endpoint("/v3/chat/message/list", Some(session))?))
            .await?;
        let first = messages
            .into_iter()
            .next()
            .ok_or_else(|| LocalizerError::Transport("Chat returned no messages".to_string()))?;
        let reply: ChatReply = serde_json::from_value(first)?;
        Ok(reply.content)
    }
}
