//! 宿主节点树接口
//!
//! 引擎只通过这组接口访问宿主的场景树：遍历子节点、识别文本节点、读取排版参数，
//! 以及写回文本、字体和位置。节点引用只在一次运行内有效。

use std::fmt;

use crate::error::{LocalizerError, Result};
use crate::types::{FontName, TextMetrics};

/// 节点分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// 文本叶子节点
    Text,
    /// 含有子节点的容器
    Container,
    /// 其他叶子节点（图片、矢量等）
    Other,
}

/// 节点的位置与尺寸
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// 宿主节点树
pub trait HostTree {
    type NodeRef: Clone + fmt::Debug;

    /// 当前选中的节点
    fn selection(&self) -> Vec<Self::NodeRef>;
    fn node_kind(&self, node: &Self::NodeRef) -> NodeKind;
    fn children(&self, node: &Self::NodeRef) -> Vec<Self::NodeRef>;
    fn node_id(&self, node: &Self::NodeRef) -> String;
    /// 节点名称，同时作为格式化时的角色提示
    fn name(&self, node: &Self::NodeRef) -> String;
    fn text(&self, node: &Self::NodeRef) -> Option<String>;
    /// 首个字符的字体、字号和行高
    fn typography(&self, node: &Self::NodeRef) -> Option<TextMetrics>;
    fn bounds(&self, node: &Self::NodeRef) -> Option<Bounds>;

    fn set_text(&mut self, node: &Self::NodeRef, text: &str) -> Result<()>;
    fn set_font(&mut self, node: &Self::NodeRef, font: &FontName) -> Result<()>;
    fn set_name(&mut self, node: &Self::NodeRef, name: &str) -> Result<()>;
    /// 深复制节点及其子树，副本与原节点同级
    fn clone_node(&mut self, node: &Self::NodeRef) -> Result<Self::NodeRef>;
    fn set_position(&mut self, node: &Self::NodeRef, x: f64, y: f64) -> Result<()>;
}

/// 场景节点内容
#[derive(Debug, Clone, PartialEq)]
pub enum SceneContent {
    Text { characters: String, metrics: TextMetrics },
    Frame { children: Vec<usize> },
    Shape,
}

#[derive(Debug, Clone)]
struct SceneNode {
    id: String,
    name: String,
    bounds: Bounds,
    content: SceneContent,
}

/// 内存场景树
///
/// 以索引为节点引用的简单节点池，供没有真实宿主的调用方和测试使用。
#[derive(Debug, Default)]
pub struct SceneTree {
    nodes: Vec<SceneNode>,
    selection: Vec<usize>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, name: &str, bounds: Bounds, content: SceneContent) -> usize {
        let index = self.nodes.len();
        self.nodes.push(SceneNode {
            id: format!("{}:{}", index / 1000, index % 1000),
            name: name.to_string(),
            bounds,
            content,
        });
        index
    }

    pub fn add_text(&mut self, name: &str, characters: &str, metrics: TextMetrics) -> usize {
        let bounds = Bounds {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: metrics.line_height,
        };
        self.push(
            name,
            bounds,
            SceneContent::Text {
                characters: characters.to_string(),
                metrics,
            },
        )
    }

    pub fn add_frame(&mut self, name: &str, bounds: Bounds, children: Vec<usize>) -> usize {
        self.push(name, bounds, SceneContent::Frame { children })
    }

    pub fn add_shape(&mut self, name: &str) -> usize {
        let bounds = Bounds {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        self.push(name, bounds, SceneContent::Shape)
    }

    pub fn select(&mut self, nodes: Vec<usize>) {
        self.selection = nodes;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn content(&self, node: usize) -> Option<&SceneContent> {
        self.nodes.get(node).map(|n| &n.content)
    }

    fn node(&self, node: usize) -> Result<&SceneNode> {
        self.nodes
            .get(node)
            .ok_or_else(|| LocalizerError::Host(format!("Stale node reference {}", node)))
    }

    fn node_mut(&mut self, node: usize) -> Result<&mut SceneNode> {
        self.nodes
            .get_mut(node)
            .ok_or_else(|| LocalizerError::Host(format!("Stale node reference {}", node)))
    }

    fn metrics_mut(&mut self, node: usize) -> Result<(&mut String, &mut TextMetrics)> {
        match &mut self.node_mut(node)?.content {
            SceneContent::Text { characters, metrics } => Ok((characters, metrics)),
            _ => Err(LocalizerError::Host(format!("Node {} is not a text node", node))),
        }
    }
}

impl HostTree for SceneTree {
    type NodeRef = usize;

    fn selection(&self) -> Vec<usize> {
        self.selection.clone()
    }

    fn node_kind(&self, node: &usize) -> NodeKind {
        match self.nodes.get(*node).map(|n| &n.content) {
            Some(SceneContent::Text { .. }) => NodeKind::Text,
            Some(SceneContent::Frame { .. }) => NodeKind::Container,
            _ => NodeKind::Other,
        }
    }

    fn children(&self, node: &usize) -> Vec<usize> {
        match self.nodes.get(*node).map(|n| &n.content) {
            Some(SceneContent::Frame { children }) => children.clone(),
            _ => Vec::new(),
        }
    }

    fn node_id(&self, node: &usize) -> String {
        self.nodes.get(*node).map(|n| n.id.clone()).unwrap_or_default()
    }

    fn name(&self, node: &usize) -> String {
        self.nodes.get(*node).map(|n| n.name.clone()).unwrap_or_default()
    }

    fn text(&self, node: &usize) -> Option<String> {
        match self.nodes.get(*node).map(|n| &n.content) {
            Some(SceneContent::Text { characters, .. }) => Some(characters.clone()),
            _ => None,
        }
    }

    fn typography(&self, node: &usize) -> Option<TextMetrics> {
        match self.nodes.get(*node).map(|n| &n.content) {
            Some(SceneContent::Text { metrics, .. }) => Some(metrics.clone()),
            _ => None,
        }
    }

    fn bounds(&self, node: &usize) -> Option<Bounds> {
        self.nodes.get(*node).map(|n| n.bounds)
    }

    fn set_text(&mut self, node: &usize, text: &str) -> Result<()> {
        let (characters, _) = self.metrics_mut(*node)?;
        *characters = text.to_string();
        Ok(())
    }

    fn set_font(&mut self, node: &usize, font: &FontName) -> Result<()> {
        let (_, metrics) = self.metrics_mut(*node)?;
        metrics.font = font.clone();
        Ok(())
    }

    fn set_name(&mut self, node: &usize, name: &str) -> Result<()> {
        self.node_mut(*node)?.name = name.to_string();
        Ok(())
    }

    fn clone_node(&mut self, node: &usize) -> Result<usize> {
        let original = self.node(*node)?.clone();
        let content = match original.content {
            SceneContent::Frame { children } => {
                let mut cloned = Vec::with_capacity(children.len());
                for child in &children {
                    cloned.push(self.clone_node(child)?);
                }
                SceneContent::Frame { children: cloned }
            }
            other => other,
        };
        Ok(self.push(&original.name, original.bounds, content))
    }

    fn set_position(&mut self, node: &usize, x: f64, y: f64) -> Result<()> {
        let bounds = &mut self.node_mut(*node)?.bounds;
        bounds.x = x;
        bounds.y = y;
        Ok(())
    }
}
