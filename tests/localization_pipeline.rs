//! 本地化流程集成测试
//!
//! 在内存节点树上跑完整的一次运行：收集 → 分发 → 格式化与排版写回

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use design_localizer::{
    spawn_http_relay, Command, DisplayMode, ErrorKind, FontName, HostTree, HttpMethod, HttpRequest, Language,
    Localizer, LocalizerError, MemorySettingsStore, MessageBridge, ProviderKind, Result, RunState, SceneTree,
    SettingKey, Transport, change_setting,
};

mod common;

use common::{
    baidu_responder, chinese_card, google_basic_responder, google_free_responder, query_param, settings,
    test_config, text_nodes, MockTransport,
};

fn sf(style: &str) -> FontName {
    FontName::new("SF Pro Text", style)
}

/// 替换模式下翻译、格式化、换字体都写回原节点
#[tokio::test]
async fn test_translate_replace_with_bulk_provider() {
    let transport = MockTransport::new(google_basic_responder);
    let localizer = Localizer::new(test_config(), transport.clone());
    let mut tree = SceneTree::new();
    let card = chinese_card(&mut tree);
    let nodes_before = tree.len();

    let report = localizer
        .run(
            &mut tree,
            &settings(Language::En, DisplayMode::Replace, ProviderKind::GoogleBasic),
            Command::Translate,
            &CancellationToken::new(),
        )
        .await
        .expect("translate run should succeed");

    assert_eq!(tree.len(), nodes_before, "Replace mode must not clone");
    assert_eq!(tree.text(&card.title).as_deref(), Some("Create New Project"));
    assert_eq!(tree.text(&card.body).as_deref(), Some("published on Mar 5, 2024"));
    assert_eq!(tree.text(&card.button).as_deref(), Some("Cancel"));
    assert_eq!(tree.text(&card.english).as_deref(), Some("already english"));

    assert_eq!(tree.typography(&card.title).unwrap().font, sf("Semibold"));
    assert_eq!(tree.typography(&card.body).unwrap().font, sf("Regular"));
    // 13/19 不在映射表中，保留原字体
    assert_eq!(tree.typography(&card.button).unwrap().font, FontName::new("PingFang SC", "Regular"));
    // 无需翻译但开启了样式检查
    assert_eq!(tree.typography(&card.english).unwrap().font, sf("Regular"));

    assert_eq!(report.units, 4);
    assert_eq!(report.translated, 3);
    assert_eq!(report.restyled, 3);
    assert_eq!(report.typography_misses, 1);
    assert_eq!(report.final_state, RunState::Idle);

    // 一次批量请求，只携带需要翻译的文本，源语言为目标语言的另一种
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let body = requests[0].body.clone().unwrap();
    assert_eq!(body["q"], json!(["创建新项目", "发布于 2024/03/05", "取消"]));
    assert_eq!(body["target"], "en");
    assert_eq!(body["source"], "zh");
    assert_eq!(query_param(&requests[0], "key").as_deref(), Some("test-key"));
}

/// 复制模式在副本上修改，原节点保持不变
#[tokio::test]
async fn test_translate_duplicate_leaves_original_untouched() {
    let transport = MockTransport::new(google_basic_responder);
    let localizer = Localizer::new(test_config(), transport);
    let mut tree = SceneTree::new();
    let card = chinese_card(&mut tree);
    let nodes_before = tree.len();

    localizer
        .run(
            &mut tree,
            &settings(Language::En, DisplayMode::Duplicate, ProviderKind::GoogleBasic),
            Command::Translate,
            &CancellationToken::new(),
        )
        .await
        .expect("duplicate run should succeed");

    assert_eq!(tree.len(), nodes_before * 2);
    assert_eq!(tree.text(&card.title).as_deref(), Some("创建新项目"));
    assert_eq!(tree.name(&card.frame), "Card");

    // 子树先于根节点复制，根的副本最后创建
    let copy = tree.len() - 1;
    assert_eq!(tree.name(&copy), "Card/en");
    let bounds = tree.bounds(&copy).unwrap();
    assert_eq!((bounds.x, bounds.y), (10.0 + 320.0 + 60.0, 20.0));

    let texts: Vec<String> = text_nodes(&tree, copy)
        .into_iter()
        .map(|n| tree.text(&n).unwrap())
        .collect();
    assert_eq!(
        texts,
        vec!["Create New Project", "published on Mar 5, 2024", "Cancel", "already english"]
    );
}

/// 逐条接口为每条文本单独发请求，结果按原顺序写回
#[tokio::test]
async fn test_translate_with_per_item_provider() {
    let transport = MockTransport::new(google_free_responder);
    let localizer = Localizer::new(test_config(), transport.clone());
    let mut tree = SceneTree::new();
    let card = chinese_card(&mut tree);

    let report = localizer
        .run(
            &mut tree,
            &settings(Language::En, DisplayMode::Replace, ProviderKind::GoogleFree),
            Command::Translate,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.translated, 3);
    assert_eq!(transport.count(), 3);
    assert!(transport
        .requests()
        .iter()
        .all(|r| r.method == HttpMethod::Get && query_param(r, "sl").as_deref() == Some("zh")));
    assert_eq!(tree.text(&card.title).as_deref(), Some("Create New Project"));
    assert_eq!(tree.text(&card.button).as_deref(), Some("Cancel"));
}

/// 越靠前的文本响应越慢，记录完成顺序
struct ReverseDelayTransport {
    order: Vec<&'static str>,
    completed: Mutex<Vec<String>>,
}

#[async_trait]
impl Transport for ReverseDelayTransport {
    async fn send(&self, request: HttpRequest) -> Result<Value> {
        let text = query_param(&request, "q").unwrap_or_default();
        let position = self.order.iter().position(|t| *t == text).unwrap_or(0);
        let delay = (self.order.len() - position) as u64 * 50;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.completed.lock().unwrap().push(text.clone());
        google_free_responder(&request)
    }
}

/// 逐条接口乱序完成时，译文仍写回各自的节点
#[tokio::test(start_paused = true)]
async fn test_per_item_results_follow_units_not_arrival() {
    let transport = Arc::new(ReverseDelayTransport {
        order: vec!["创建新项目", "发布于 2024/03/05", "取消"],
        completed: Mutex::new(Vec::new()),
    });
    let localizer = Localizer::new(test_config(), transport.clone());
    let mut tree = SceneTree::new();
    let card = chinese_card(&mut tree);

    let report = localizer
        .run(
            &mut tree,
            &settings(Language::En, DisplayMode::Replace, ProviderKind::GoogleFree),
            Command::Translate,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        *transport.completed.lock().unwrap(),
        vec!["取消", "发布于 2024/03/05", "创建新项目"]
    );
    assert_eq!(report.translated, 3);
    assert_eq!(tree.text(&card.title).as_deref(), Some("Create New Project"));
    assert_eq!(tree.text(&card.body).as_deref(), Some("published on Mar 5, 2024"));
    assert_eq!(tree.text(&card.button).as_deref(), Some("Cancel"));
}

/// 签名接口经由消息桥转发
#[tokio::test]
async fn test_translate_with_signed_provider_over_bridge() {
    let transport = MockTransport::new(baidu_responder);
    let (bridge, receiver) = MessageBridge::new(Duration::from_secs(5));
    let relay_transport: Arc<dyn Transport> = transport.clone();
    spawn_http_relay(receiver, relay_transport, bridge.clone());

    let localizer = Localizer::new(test_config(), transport.clone()).with_bridge(bridge.clone());
    let mut tree = SceneTree::new();
    let card = chinese_card(&mut tree);

    localizer
        .run(
            &mut tree,
            &settings(Language::En, DisplayMode::Replace, ProviderKind::Baidu),
            Command::Translate,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(tree.text(&card.body).as_deref(), Some("published on Mar 5, 2024"));
    assert_eq!(bridge.pending_len(), 0);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(query_param(request, "q").as_deref(), Some("创建新项目\n发布于 2024/03/05\n取消"));
    assert_eq!(query_param(request, "from").as_deref(), Some("zh"));
    assert_eq!(query_param(request, "to").as_deref(), Some("en"));
    assert_eq!(query_param(request, "sign").map(|s| s.len()), Some(32));
}

/// 取消等待中的签名请求后，消息桥不残留等待条目
#[tokio::test(start_paused = true)]
async fn test_cancelled_signed_run_leaves_bridge_clean() {
    let transport = MockTransport::new(baidu_responder);
    let (bridge, mut receiver) = MessageBridge::new(Duration::from_secs(15));
    let localizer = Localizer::new(test_config(), transport.clone()).with_bridge(bridge.clone());
    let mut tree = SceneTree::new();
    let card = chinese_card(&mut tree);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = localizer
        .run(
            &mut tree,
            &settings(Language::En, DisplayMode::Replace, ProviderKind::Baidu),
            Command::Translate,
            &cancel,
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(receiver.try_recv().is_ok());
    assert_eq!(bridge.pending_len(), 0);
    assert_eq!(tree.text(&card.title).as_deref(), Some("创建新项目"));
}

/// 目标为中文时货币符号替换，已是中文的文本不翻译
#[tokio::test]
async fn test_translate_to_chinese_swaps_currency() {
    let transport = MockTransport::new(google_basic_responder);
    let localizer = Localizer::new(test_config(), transport.clone());
    let mut tree = SceneTree::new();
    let hello = tree.add_text("Greeting", "Hello", common::metrics("SF Pro Text", "Medium", 14.0, 22.0));
    let price = tree.add_text("Price", "Price: USD 20", common::metrics("SF Pro Text", "Regular", 14.0, 22.0));
    let chinese = tree.add_text("Done", "完成", common::metrics("SF Pro Text", "Regular", 14.0, 22.0));
    tree.select(vec![hello, price, chinese]);

    let report = localizer
        .run(
            &mut tree,
            &settings(Language::Zh, DisplayMode::Replace, ProviderKind::GoogleBasic),
            Command::Translate,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.translated, 2);
    assert_eq!(tree.text(&hello).as_deref(), Some("你好"));
    assert_eq!(tree.text(&price).as_deref(), Some("价格：CNY 20"));
    assert_eq!(tree.text(&chinese).as_deref(), Some("完成"));
    assert_eq!(tree.typography(&hello).unwrap().font, FontName::new("PingFang SC", "Medium"));

    let body = transport.requests()[0].body.clone().unwrap();
    assert_eq!(body["source"], "en");
    assert_eq!(body["target"], "zh");
}

/// 只做样式检查时不发任何请求
#[tokio::test]
async fn test_style_check_only_changes_fonts() {
    let transport = MockTransport::new(google_basic_responder);
    let localizer = Localizer::new(test_config(), transport.clone());
    let mut tree = SceneTree::new();
    let card = chinese_card(&mut tree);

    let report = localizer
        .run(
            &mut tree,
            &settings(Language::En, DisplayMode::Replace, ProviderKind::GoogleBasic),
            Command::StyleCheck,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(transport.count(), 0);
    assert_eq!(report.translated, 0);
    assert_eq!(report.restyled, 3);
    assert_eq!(tree.text(&card.title).as_deref(), Some("创建新项目"));
    assert_eq!(tree.typography(&card.title).unwrap().font, sf("Semibold"));
}

/// 自动样式检查关闭时，无需翻译的节点保持原字体
#[tokio::test]
async fn test_auto_stylelint_off_skips_untranslated_units() {
    let transport = MockTransport::new(google_basic_responder);
    let localizer = Localizer::new(test_config(), transport);
    let mut tree = SceneTree::new();
    let card = chinese_card(&mut tree);

    let mut snapshot = settings(Language::En, DisplayMode::Replace, ProviderKind::GoogleBasic);
    snapshot.auto_stylelint_mode = design_localizer::AutoStylelintMode::Off;
    localizer
        .run(&mut tree, &snapshot, Command::Translate, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(tree.typography(&card.english).unwrap().font, FontName::new("PingFang SC", "Regular"));
    assert_eq!(tree.typography(&card.title).unwrap().font, sf("Semibold"));
}

/// 没有选中节点时什么都不做
#[tokio::test]
async fn test_empty_selection_is_noop() {
    let transport = MockTransport::new(google_basic_responder);
    let localizer = Localizer::new(test_config(), transport.clone());
    let mut tree = SceneTree::new();
    tree.add_text("Orphan", "孤立", common::metrics("PingFang SC", "Regular", 14.0, 22.0));

    let report = localizer
        .run(
            &mut tree,
            &settings(Language::En, DisplayMode::Duplicate, ProviderKind::GoogleBasic),
            Command::Translate,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.units, 0);
    assert_eq!(report.final_state, RunState::Idle);
    assert_eq!(tree.len(), 1);
    assert_eq!(transport.count(), 0);
}

/// 服务失败时整次运行失败，节点保持原样
#[tokio::test]
async fn test_provider_failure_aborts_run() {
    let transport = MockTransport::new(|_| {
        Err(LocalizerError::Http {
            status: 403,
            message: "quota exceeded".to_string(),
        })
    });
    let localizer = Localizer::new(test_config(), transport);
    let mut tree = SceneTree::new();
    let card = chinese_card(&mut tree);

    let err = localizer
        .run(
            &mut tree,
            &settings(Language::En, DisplayMode::Replace, ProviderKind::GoogleBasic),
            Command::Translate,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    let message = err.to_string();
    assert!(message.contains("Request failed in translator"), "{}", message);
    assert!(message.contains("quota exceeded"), "{}", message);
    assert_eq!(tree.text(&card.title).as_deref(), Some("创建新项目"));
}

/// 逐条翻译时任意一条失败则整批失败
#[tokio::test]
async fn test_single_item_failure_fails_batch() {
    let transport = MockTransport::new(|request| {
        if query_param(request, "q").as_deref() == Some("取消") {
            Err(LocalizerError::Connection("reset".to_string()))
        } else {
            google_free_responder(request)
        }
    });
    let localizer = Localizer::new(test_config(), transport);
    let mut tree = SceneTree::new();
    let card = chinese_card(&mut tree);

    let result = localizer
        .run(
            &mut tree,
            &settings(Language::En, DisplayMode::Replace, ProviderKind::GoogleFree),
            Command::Translate,
            &CancellationToken::new(),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(tree.text(&card.title).as_deref(), Some("创建新项目"));
}

/// 缺少凭据时在修改节点树之前失败
#[tokio::test]
async fn test_missing_credentials_fail_before_cloning() {
    let transport = MockTransport::new(google_basic_responder);
    let mut config = test_config();
    config.providers.google_api_key = None;
    let localizer = Localizer::new(config, transport.clone());
    let mut tree = SceneTree::new();
    chinese_card(&mut tree);
    let nodes_before = tree.len();

    let err = localizer
        .run(
            &mut tree,
            &settings(Language::En, DisplayMode::Duplicate, ProviderKind::GoogleBasic),
            Command::Translate,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(tree.len(), nodes_before);
    assert_eq!(transport.count(), 0);
}

/// 签名接口没有消息桥时是配置错误
#[tokio::test]
async fn test_signed_provider_without_bridge_is_configuration_error() {
    let localizer = Localizer::new(test_config(), MockTransport::new(baidu_responder));
    let mut tree = SceneTree::new();
    chinese_card(&mut tree);

    let err = localizer
        .run(
            &mut tree,
            &settings(Language::En, DisplayMode::Replace, ProviderKind::Baidu),
            Command::Translate,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

/// 服务漏掉译文时保留原文，不写入空字符串
#[tokio::test]
async fn test_empty_translation_keeps_original_text() {
    let transport = MockTransport::new(|_| {
        Ok(json!({ "data": { "translations": [{ "translatedText": "create new project" }, {}, {}] } }))
    });
    let localizer = Localizer::new(test_config(), transport);
    let mut tree = SceneTree::new();
    let card = chinese_card(&mut tree);

    let report = localizer
        .run(
            &mut tree,
            &settings(Language::En, DisplayMode::Replace, ProviderKind::GoogleBasic),
            Command::Translate,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.translated, 1);
    assert_eq!(report.empty_results, 2);
    assert_eq!(tree.text(&card.title).as_deref(), Some("Create New Project"));
    assert_eq!(tree.text(&card.body).as_deref(), Some("发布于 2024/03/05"));
    assert_eq!(tree.text(&card.button).as_deref(), Some("取消"));
}

/// 已取消的运行不写回任何结果
#[tokio::test]
async fn test_cancelled_run_applies_nothing() {
    let localizer = Localizer::new(test_config(), MockTransport::new(google_basic_responder));
    let mut tree = SceneTree::new();
    let card = chinese_card(&mut tree);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = localizer
        .run(
            &mut tree,
            &settings(Language::En, DisplayMode::Replace, ProviderKind::GoogleBasic),
            Command::Translate,
            &cancel,
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(tree.text(&card.title).as_deref(), Some("创建新项目"));
}

/// 每次运行开始时读取设置存储
#[tokio::test]
async fn test_handle_reads_settings_each_run() {
    let transport = MockTransport::new(google_basic_responder);
    let localizer = Localizer::new(test_config(), transport.clone());
    let store = MemorySettingsStore::new();
    change_setting(&store, SettingKey::DisplayMode, "replace").unwrap();

    let mut tree = SceneTree::new();
    let card = chinese_card(&mut tree);
    let cancel = CancellationToken::new();

    localizer
        .handle(&mut tree, &store, Command::StyleCheck, &cancel)
        .await
        .unwrap();
    assert_eq!(transport.count(), 0);

    change_setting(&store, SettingKey::TranslationProvider, "GoogleFree").unwrap();
    localizer
        .handle(&mut tree, &store, Command::Translate, &cancel)
        .await
        .unwrap();
    assert_eq!(transport.count(), 3);
    assert_eq!(tree.text(&card.button).as_deref(), Some("Cancel"));
}
