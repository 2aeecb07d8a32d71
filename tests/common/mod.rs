// 集成测试公共模块
//
// 提供内存传输、测试节点树和配置构建等辅助工具

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::Instant;

use design_localizer::{
    AutoStylelintMode, Bounds, DisplayMode, FontName, HttpRequest, Language, LocalizerLibConfig, ProviderKind,
    Result, SceneTree, Settings, TextMetrics, Transport,
};

type Responder = Box<dyn Fn(&HttpRequest) -> Result<Value> + Send + Sync>;

/// 内存传输，记录每个请求及其开始时间
pub struct MockTransport {
    requests: Mutex<Vec<(Instant, HttpRequest)>>,
    responder: Responder,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest) -> Result<Value> + Send + Sync + 'static,
    {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn start_times(&self) -> Vec<Instant> {
        self.requests.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<Value> {
        self.requests.lock().unwrap().push((Instant::now(), request.clone()));
        (self.responder)(&request)
    }
}

/// 测试用词典
pub fn dictionary() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("创建新项目", "create new project"),
        ("发布于 2024/03/05", "published on 2024/03/05"),
        ("价格：$ 20", "price: $ 20"),
        ("取消", "cancel"),
        ("Hello", "你好"),
        ("Price: USD 20", "价格：USD 20"),
    ])
}

pub fn lookup(text: &str) -> String {
    dictionary()
        .get(text)
        .map(|t| t.to_string())
        .unwrap_or_else(|| format!("<{}>", text))
}

/// 模拟批量接口：按请求体里的 `q` 逐条查词典
pub fn google_basic_responder(request: &HttpRequest) -> Result<Value> {
    let texts: Vec<String> = request
        .body
        .as_ref()
        .and_then(|b| b.get("q"))
        .and_then(|q| serde_json::from_value(q.clone()).ok())
        .unwrap_or_default();
    let translations: Vec<Value> = texts
        .iter()
        .map(|t| json!({ "translatedText": lookup(t) }))
        .collect();
    Ok(json!({ "data": { "translations": translations } }))
}

pub fn query_param(request: &HttpRequest, name: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// 模拟免费接口：返回分段数组
pub fn google_free_responder(request: &HttpRequest) -> Result<Value> {
    let text = query_param(request, "q").unwrap_or_default();
    Ok(json!([[[lookup(&text), text, null]], null, "zh-CN"]))
}

/// 模拟签名接口：按行翻译
pub fn baidu_responder(request: &HttpRequest) -> Result<Value> {
    let query = query_param(request, "q").unwrap_or_default();
    let lines: Vec<Value> = query
        .split('\n')
        .map(|line| json!({ "src": line, "dst": lookup(line) }))
        .collect();
    Ok(json!({ "from": "zh", "to": "en", "trans_result": lines }))
}

pub fn test_config() -> LocalizerLibConfig {
    let mut config = LocalizerLibConfig::default();
    config.providers.google_api_key = Some("test-key".to_string());
    config.providers.baidu_app_id = Some("2015063000000001".to_string());
    config.providers.baidu_secret = Some("12345678".to_string());
    config.polish.token = Some("test-token".to_string());
    config.polish.bot_id = Some("bot-1".to_string());
    config.polish.poll_interval_ms = 10;
    config.localization.polish_interval_ms = 10;
    config.localization.translation_interval_ms = 1;
    config
}

pub fn settings(target: Language, mode: DisplayMode, provider: ProviderKind) -> Settings {
    Settings {
        target_language: target,
        display_mode: mode,
        auto_stylelint_mode: AutoStylelintMode::On,
        translation_provider: provider,
        is_first_open: false,
    }
}

pub fn metrics(family: &str, style: &str, size: f64, line_height: f64) -> TextMetrics {
    TextMetrics {
        font: FontName::new(family, style),
        font_size: size,
        line_height,
    }
}

/// 测试卡片的节点引用
pub struct Card {
    pub frame: usize,
    pub title: usize,
    pub body: usize,
    pub button: usize,
    pub english: usize,
}

/// 构建一个中文卡片：标题、正文、按钮，以及一条已经是英文的说明
pub fn chinese_card(tree: &mut SceneTree) -> Card {
    let title = tree.add_text("Dialog-title", "创建新项目", metrics("PingFang SC", "Semibold", 24.0, 36.0));
    let body = tree.add_text("Body", "发布于 2024/03/05", metrics("PingFang SC", "Regular", 14.0, 22.0));
    let button = tree.add_text("Button-text", "取消", metrics("PingFang SC", "Regular", 13.0, 19.0));
    let english = tree.add_text("Hint", "already english", metrics("PingFang SC", "Regular", 12.0, 20.0));
    let icon = tree.add_shape("Icon");
    let inner = tree.add_frame(
        "Footer",
        Bounds { x: 0.0, y: 160.0, width: 320.0, height: 40.0 },
        vec![button, icon, english],
    );
    let frame = tree.add_frame(
        "Card",
        Bounds { x: 10.0, y: 20.0, width: 320.0, height: 200.0 },
        vec![title, body, inner],
    );
    tree.select(vec![frame]);
    Card { frame, title, body, button, english }
}

/// 按文档顺序列出子树中的文本节点
pub fn text_nodes(tree: &SceneTree, root: usize) -> Vec<usize> {
    use design_localizer::{HostTree, NodeKind};
    match tree.node_kind(&root) {
        NodeKind::Text => vec![root],
        NodeKind::Container => tree.children(&root).into_iter().flat_map(|c| text_nodes(tree, c)).collect(),
        NodeKind::Other => Vec::new(),
    }
}
