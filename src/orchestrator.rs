//! 本地化编排
//!
//! 一次运行的状态流转：`Idle -> CollectingUnits -> Dispatching -> ApplyingResults -> Idle`，
//! 任一阶段出现不可恢复的错误都进入 `Failed`。每次运行读取新的设置快照，创建新的分发器。

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::bridge::{spawn_http_relay, MessageBridge};
use crate::collector::collect_units;
use crate::config::LocalizerLibConfig;
use crate::error::{LocalizerError, Result};
use crate::formatter::format_content;
use crate::host::HostTree;
use crate::polisher::{needs_polishing, Polisher};
use crate::provider::{probe_google_basic, TranslationProvider};
use crate::settings::{Settings, SettingsStore};
use crate::translator::Dispatcher;
use crate::transport::{ReqwestTransport, Transport};
use crate::typography::resolve_font;
use crate::types::{AutoStylelintMode, DisplayMode, ProcessUnit};

/// 来自界面的命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// 翻译，样式检查取决于 `AutoStylelintMode`
    Translate,
    /// 只做样式检查
    StyleCheck,
    /// 润色选中的文本
    Polish,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Translate => "translate",
            Command::StyleCheck => "style check",
            Command::Polish => "polish",
        };
        f.write_str(name)
    }
}

/// 运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    CollectingUnits,
    Dispatching,
    ApplyingResults,
    Failed,
}

/// 运行结果统计
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub command: Command,
    /// 收集到的处理单元数
    pub units: usize,
    /// 写回译文的单元数
    pub translated: usize,
    /// 匹配到规范字体的单元数
    pub restyled: usize,
    /// 排版映射未命中、保留原字体的单元数
    pub typography_misses: usize,
    /// 写回润色结果的单元数
    pub polished: usize,
    /// 服务返回空结果、保留原文的单元数
    pub empty_results: usize,
    pub final_state: RunState,
}

impl RunReport {
    fn new(command: Command) -> Self {
        Self {
            command,
            units: 0,
            translated: 0,
            restyled: 0,
            typography_misses: 0,
            polished: 0,
            empty_results: 0,
            final_state: RunState::Idle,
        }
    }
}

struct Run {
    state: RunState,
    report: RunReport,
}

impl Run {
    fn transition(&mut self, next: RunState) {
        debug!("运行状态 {:?} -> {:?}", self.state, next);
        self.state = next;
        self.report.final_state = next;
    }
}

async fn cancellable<F, T>(cancel: &CancellationToken, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LocalizerError::Cancelled),
        result = operation => result,
    }
}

/// 本地化引擎
///
/// # 示例
///
/// ```rust,no_run
/// use design_localizer::{Command, Localizer, LocalizerLibConfig, MemorySettingsStore, SceneTree};
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let localizer = Localizer::from_config(LocalizerLibConfig::load_from_default_locations());
///     let store = MemorySettingsStore::new();
///     let mut tree = SceneTree::new();
///
///     let report = localizer
///         .handle(&mut tree, &store, Command::Translate, &CancellationToken::new())
///         .await?;
///     println!("{:?}", report);
///     Ok(())
/// }
/// ```
pub struct Localizer {
    config: LocalizerLibConfig,
    transport: Arc<dyn Transport>,
    bridge: Option<Arc<MessageBridge>>,
}

impl Localizer {
    pub fn new(config: LocalizerLibConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            bridge: None,
        }
    }

    /// 使用 reqwest 传输创建引擎
    pub fn from_config(config: LocalizerLibConfig) -> Self {
        let transport = ReqwestTransport::new(
            Duration::from_secs(config.localization.request_timeout_secs),
            config.retry.clone(),
        );
        Self::new(config, Arc::new(transport))
    }

    /// 接入外部的消息桥，签名请求经由它发出
    pub fn with_bridge(mut self, bridge: Arc<MessageBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// 创建消息桥并在当前运行时上启动HTTP转发任务
    pub fn spawn_http_bridge(self) -> Self {
        let (bridge, receiver) =
            MessageBridge::new(Duration::from_secs(self.config.localization.bridge_timeout_secs));
        spawn_http_relay(receiver, self.transport.clone(), bridge.clone());
        self.with_bridge(bridge)
    }

    pub fn config(&self) -> &LocalizerLibConfig {
        &self.config
    }

    /// 检测批量翻译接口是否可用
    pub async fn probe_bulk_provider(&self) -> bool {
        probe_google_basic(self.transport.as_ref(), &self.config.providers).await
    }

    /// 处理界面命令：读取设置快照后执行一次运行
    pub async fn handle<T: HostTree>(
        &self,
        tree: &mut T,
        store: &dyn SettingsStore,
        command: Command,
        cancel: &CancellationToken,
    ) -> Result<RunReport> {
        let settings = Settings::load(store)?;
        self.run(tree, &settings, command, cancel).await
    }

    /// 按给定设置执行一次运行
    ///
    /// 失败时已经写回的单元不会回滚，错误以单个聚合错误返回。
    pub async fn run<T: HostTree>(
        &self,
        tree: &mut T,
        settings: &Settings,
        command: Command,
        cancel: &CancellationToken,
    ) -> Result<RunReport> {
        let mut run = Run {
            state: RunState::Idle,
            report: RunReport::new(command),
        };

        match self.execute(tree, settings, &mut run, cancel).await {
            Ok(()) => {
                run.transition(RunState::Idle);
                info!(
                    "【处理完成】单元 {}，翻译 {}，样式 {}，润色 {}",
                    run.report.units, run.report.translated, run.report.restyled, run.report.polished
                );
                Ok(run.report)
            }
            Err(e) => {
                let failed_in = run.state;
                run.transition(RunState::Failed);
                error!("【处理失败】{:?}: {}", failed_in, e);
                Err(e.with_context(format!("{} run failed during {:?}", command, failed_in)))
            }
        }
    }

    async fn execute<T: HostTree>(
        &self,
        tree: &mut T,
        settings: &Settings,
        run: &mut Run,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let selection = tree.selection();
        if selection.is_empty() {
            info!("【没有选中节点】");
            return Ok(());
        }

        let command = run.report.command;
        let target = settings.target_language;
        run.transition(RunState::CollectingUnits);
        info!("【开始处理】目标语言: {}, 显示模式: {}", target, settings.display_mode);

        let (translate, style_check) = match command {
            Command::Translate => (true, settings.auto_stylelint_mode == AutoStylelintMode::On),
            Command::StyleCheck => (false, true),
            Command::Polish => (false, false),
        };

        // 配置问题在修改节点树之前暴露
        let provider = if translate {
            Some(TranslationProvider::from_config(
                settings.translation_provider,
                &self.config,
                self.transport.clone(),
                self.bridge.clone(),
            )?)
        } else {
            None
        };
        let polisher = if command == Command::Polish {
            Some(Polisher::new(self.transport.clone(), &self.config)?)
        } else {
            None
        };

        let roots = match settings.display_mode {
            DisplayMode::Duplicate => self.duplicate_roots(tree, &selection, settings)?,
            DisplayMode::Replace => selection,
        };
        let mut units = collect_units(tree, &roots, translate, style_check, target);
        run.report.units = units.len();
        info!("【单元准备就绪】{} 个", units.len());

        run.transition(RunState::Dispatching);
        if let Some(provider) = &provider {
            let dispatcher =
                Dispatcher::for_translation(Duration::from_millis(self.config.localization.translation_interval_ms));
            let pending: Vec<usize> = (0..units.len()).filter(|&i| units[i].needs_translation).collect();
            let texts: Vec<String> = pending
                .iter()
                .map(|&i| tree.text(&units[i].node_ref).unwrap_or_default())
                .collect();

            let translated = cancellable(cancel, provider.translate(&texts, target, &dispatcher)).await?;
            for (index, text) in pending.into_iter().zip(translated) {
                units[index].translation_provider = Some(provider.kind());
                units[index].translated_text = Some(text);
            }
        }
        if let Some(polisher) = &polisher {
            for unit in units.iter_mut() {
                let content = tree.text(&unit.node_ref).unwrap_or_default();
                if needs_polishing(&content) {
                    unit.translated_text = Some(cancellable(cancel, polisher.polish(&content, target)).await?);
                }
            }
        }

        run.transition(RunState::ApplyingResults);
        for unit in &units {
            if cancel.is_cancelled() {
                return Err(LocalizerError::Cancelled);
            }
            self.apply_unit(tree, unit, command, &mut run.report)?;
        }
        Ok(())
    }

    /// 复制模式：复制每个根节点，命名为 `{name}/{lang}`，向右平移自身宽度加间距
    fn duplicate_roots<T: HostTree>(
        &self,
        tree: &mut T,
        selection: &[T::NodeRef],
        settings: &Settings,
    ) -> Result<Vec<T::NodeRef>> {
        let margin = self.config.localization.duplicate_margin;
        let mut clones = Vec::with_capacity(selection.len());
        for node in selection {
            let clone = tree.clone_node(node)?;
            let name = format!("{}/{}", tree.name(&clone), settings.target_language);
            tree.set_name(&clone, &name)?;
            match tree.bounds(&clone) {
                Some(bounds) => tree.set_position(&clone, bounds.x + bounds.width + margin, bounds.y)?,
                None => warn!("节点 {} 没有位置信息，副本未平移", tree.node_id(&clone)),
            }
            clones.push(clone);
        }
        Ok(clones)
    }

    fn apply_unit<T: HostTree>(
        &self,
        tree: &mut T,
        unit: &ProcessUnit<T::NodeRef>,
        command: Command,
        report: &mut RunReport,
    ) -> Result<()> {
        match (&unit.translated_text, command) {
            (Some(result), _) if result.trim().is_empty() => {
                warn!("节点 {} 的{}结果为空，保留原文", unit.node_id, command);
                report.empty_results += 1;
            }
            (Some(polished), Command::Polish) => {
                tree.set_text(&unit.node_ref, polished)?;
                report.polished += 1;
            }
            (Some(raw), _) => {
                let role_hint = tree.name(&unit.node_ref);
                let formatted = format_content(raw, unit.target_language, &role_hint);
                self.restyle(tree, unit, report)?;
                tree.set_text(&unit.node_ref, &formatted)?;
                report.translated += 1;
            }
            (None, _) if unit.needs_style_check => self.restyle(tree, unit, report)?,
            (None, _) => {}
        }
        Ok(())
    }

    /// 查找目标语言/设备下的规范字体；未命中时保留原字体
    fn restyle<T: HostTree>(
        &self,
        tree: &mut T,
        unit: &ProcessUnit<T::NodeRef>,
        report: &mut RunReport,
    ) -> Result<()> {
        let device_class = self.config.localization.device_class;
        let Some(metrics) = tree.typography(&unit.node_ref) else {
            report.typography_misses += 1;
            return Ok(());
        };

        match resolve_font(
            &metrics.font,
            metrics.font_size,
            metrics.line_height,
            unit.target_language,
            device_class,
        ) {
            Some(font) => {
                if font != metrics.font {
                    tree.set_font(&unit.node_ref, &font)?;
                }
                report.restyled += 1;
            }
            None => {
                debug!(
                    "节点 {} 排版未命中: {} {} {}/{}",
                    unit.node_id, metrics.font.family, metrics.font.style, metrics.font_size, metrics.line_height
                );
                report.typography_misses += 1;
            }
        }
        Ok(())
    }
}
