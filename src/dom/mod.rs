//! DOM 抽象模块
//! 核心职责：
//! 1. 定义控制器依赖的最小 DOM 能力（`Dom` 特质）：查询、类名操作、属性读取、节点增删移动
//! 2. 提供基于 arena 的内存文档实现（`Document`），HTML 片段由 lol_html 解析
//! 3. 提供简单 CSS 选择器（标签 / #id / .class / [attr] / [attr=value]）
pub mod document;
pub mod parser;
pub mod selector;
pub mod serializer;

use std::fmt::{Display, Formatter};

use crate::error::{TruncateError, TruncateResult};

pub use self::document::Document;
pub use self::selector::Selector;

/// 节点句柄（arena 下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// 控制器所需的 DOM 能力
/// 必需方法只覆盖最底层的读写；类名、兄弟节点、文本拼接等由默认实现在其上组合
pub trait Dom {
    /// 文档根节点
    fn root(&self) -> NodeId;

    /// 句柄是否属于本文档
    fn has_node(&self, node: NodeId) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// 所有子节点（含文本节点），文档顺序
    fn child_nodes(&self, node: NodeId) -> Vec<NodeId>;

    /// 元素标签名（小写）；文本节点 / 根节点返回 None
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    /// 文本节点内容；元素返回 None
    fn text(&self, node: NodeId) -> Option<&str>;

    fn create_element(&mut self, tag: &str) -> NodeId;

    fn create_text(&mut self, text: &str) -> NodeId;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn remove_attribute(&mut self, node: NodeId, name: &str);

    fn set_text(&mut self, node: NodeId, text: &str);

    /// 追加为最后一个子节点（先从原位置摘除）
    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// 插入到 reference 之前（先从原位置摘除）
    fn insert_before(&mut self, reference: NodeId, node: NodeId);

    /// 从树中摘除（节点本身保留，可再次插入）
    fn detach(&mut self, node: NodeId);

    /// 校验外部传入的节点句柄
    fn check(&self, node: NodeId) -> TruncateResult<NodeId> {
        if self.has_node(node) {
            Ok(node)
        } else {
            Err(TruncateError::UnknownNode(node))
        }
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.tag_name(node).is_some()
    }

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// 元素子节点
    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.child_nodes(node)
            .into_iter()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .map_or(false, |value| value.split_whitespace().any(|c| c == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if !self.is_element(node) || self.has_class(node, class) {
            return;
        }
        let value = match self.attribute(node, "class").map(str::trim) {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
            _ => class.to_string(),
        };
        self.set_attribute(node, "class", &value);
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        let rest = self
            .attribute(node, "class")
            .unwrap_or_default()
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        if rest.is_empty() {
            self.remove_attribute(node, "class");
        } else {
            self.set_attribute(node, "class", &rest);
        }
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.child_nodes(parent);
        let pos = siblings.iter().position(|n| *n == node)?;
        siblings.get(pos + 1).copied()
    }

    /// 元素兄弟节点（不含自身）
    fn siblings(&self, node: NodeId) -> Vec<NodeId> {
        match self.parent(node) {
            Some(parent) => self
                .children(parent)
                .into_iter()
                .filter(|n| *n != node)
                .collect(),
            None => Vec::new(),
        }
    }

    fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        match self.next_sibling(reference) {
            Some(next) if next != node => self.insert_before(next, node),
            Some(_) => {}
            None => {
                if let Some(parent) = self.parent(reference) {
                    self.append_child(parent, node);
                }
            }
        }
    }

    /// 后代节点（先序遍历，不含自身）
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = self.child_nodes(node);
        stack.reverse();
        while let Some(current) = stack.pop() {
            out.push(current);
            let mut kids = self.child_nodes(current);
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    /// 纯文本内容（所有后代文本节点拼接）
    fn text_content(&self, node: NodeId) -> String {
        if let Some(text) = self.text(node) {
            return text.to_string();
        }
        self.descendants(node)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// 在字符偏移处拆分文本节点，返回新建的后半段节点
    /// 偏移落在两端（无需拆分）或节点不是文本时返回 None
    fn split_text(&mut self, node: NodeId, char_offset: usize) -> Option<NodeId> {
        let text = self.text(node)?.to_string();
        let byte_offset = text.char_indices().nth(char_offset).map(|(i, _)| i)?;
        if byte_offset == 0 {
            return None;
        }
        let (head, tail) = text.split_at(byte_offset);
        let tail_node = self.create_text(tail);
        self.set_text(node, head);
        self.insert_after(node, tail_node);
        Some(tail_node)
    }
}
