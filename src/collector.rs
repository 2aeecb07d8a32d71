//! 处理单元收集器
//!
//! 深度优先遍历选中的节点，每个文本节点生成一个处理单元，顺序与文档顺序一致。

use tracing::debug;

use crate::gate::needs_translation;
use crate::host::{HostTree, NodeKind};
use crate::types::{Language, ProcessUnit};

/// 收集处理单元
///
/// # 参数
///
/// * `roots` - 遍历的根节点
/// * `translate` - 本次运行是否翻译；为真时再按内容判定每个单元
/// * `style_check` - 本次运行是否做样式检查，对所有单元一致
/// * `target_language` - 目标语言
pub fn collect_units<T: HostTree>(
    tree: &T,
    roots: &[T::NodeRef],
    translate: bool,
    style_check: bool,
    target_language: Language,
) -> Vec<ProcessUnit<T::NodeRef>> {
    let mut units = Vec::new();
    for root in roots {
        visit(tree, root, translate, style_check, target_language, &mut units);
    }
    debug!("收集到 {} 个处理单元", units.len());
    units
}

fn visit<T: HostTree>(
    tree: &T,
    node: &T::NodeRef,
    translate: bool,
    style_check: bool,
    target_language: Language,
    units: &mut Vec<ProcessUnit<T::NodeRef>>,
) {
    match tree.node_kind(node) {
        NodeKind::Text => {
            let content = tree.text(node).unwrap_or_default();
            units.push(ProcessUnit {
                node_ref: node.clone(),
                node_id: tree.node_id(node),
                target_language,
                needs_translation: translate && needs_translation(&content, target_language),
                needs_style_check: style_check,
                translation_provider: None,
                translated_text: None,
            });
        }
        NodeKind::Container => {
            for child in tree.children(node) {
                visit(tree, &child, translate, style_check, target_language, units);
            }
        }
        NodeKind::Other => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Bounds, SceneTree};
    use crate::types::{FontName, TextMetrics};

    fn metrics() -> TextMetrics {
        TextMetrics {
            font: FontName::new("PingFang SC", "Regular"),
            font_size: 14.0,
            line_height: 22.0,
        }
    }

    fn frame_bounds() -> Bounds {
        Bounds { x: 0.0, y: 0.0, width: 200.0, height: 100.0 }
    }

    #[test]
    fn one_unit_per_text_leaf_in_document_order() {
        let mut tree = SceneTree::new();
        let title = tree.add_text("Dialog-title", "标题", metrics());
        let icon = tree.add_shape("Icon");
        let body = tree.add_text("Body", "already english", metrics());
        let inner = tree.add_frame("Inner", frame_bounds(), vec![body]);
        let outer = tree.add_frame("Outer", frame_bounds(), vec![title, icon, inner]);
        let footer = tree.add_text("Footer", "页脚", metrics());

        let units = collect_units(&tree, &[outer, footer], true, false, Language::En);
        let refs: Vec<usize> = units.iter().map(|u| u.node_ref).collect();
        assert_eq!(refs, vec![title, body, footer]);
        assert_eq!(
            units.iter().map(|u| u.needs_translation).collect::<Vec<_>>(),
            vec![true, false, true]
        );
        assert!(units.iter().all(|u| !u.needs_style_check && u.translated_text.is_none()));
    }

    #[test]
    fn translation_flag_off_disables_gate() {
        let mut tree = SceneTree::new();
        let text = tree.add_text("Body", "你好", metrics());
        let units = collect_units(&tree, &[text], false, true, Language::En);
        assert_eq!(units.len(), 1);
        assert!(!units[0].needs_translation);
        assert!(units[0].needs_style_check);
    }

    #[test]
    fn non_text_roots_yield_nothing() {
        let mut tree = SceneTree::new();
        let shape = tree.add_shape("Icon");
        let empty = tree.add_frame("Empty", frame_bounds(), vec![]);
        assert!(collect_units(&tree, &[shape, empty], true, true, Language::Zh).is_empty());
    }
}
