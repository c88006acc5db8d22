//! 内存文档：基于 arena 的 DOM 实现
//! 节点只增不删（摘除后仍保留在 arena 中），NodeId 在文档生命周期内稳定
use crate::dom::{Dom, NodeId, Selector};
use crate::error::TruncateResult;

/// 元素数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

/// 节点类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// 内存文档
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// 空文档（仅含根节点）
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Root)],
        }
    }

    /// 解析 HTML 片段
    pub fn parse(html: &str) -> TruncateResult<Self> {
        super::parser::parse_fragment(html)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node.0).map(|n| &n.kind)
    }

    /// 选择所有匹配的元素（文档顺序）
    pub fn select(&self, selector: &str) -> TruncateResult<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self.select_with(&selector))
    }

    pub fn select_with(&self, selector: &Selector) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|n| selector.matches(self, *n))
            .collect()
    }

    pub fn select_first(&self, selector: &str) -> TruncateResult<Option<NodeId>> {
        Ok(self.select(selector)?.into_iter().next())
    }

    /// 元素外部 HTML
    pub fn outer_html(&self, node: NodeId) -> String {
        super::serializer::outer_html(self, node)
    }

    /// 元素内部 HTML
    pub fn inner_html(&self, node: NodeId) -> String {
        super::serializer::inner_html(self, node)
    }

    /// 整个文档序列化
    pub fn to_html(&self) -> String {
        self.inner_html(self.root())
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match self.nodes.get_mut(node.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(data)) => Some(data),
            _ => None,
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node::new(kind));
        NodeId(self.nodes.len() - 1)
    }

    /// 插入前的合法性检查：节点存在、不是根、不会成为自身后代
    fn can_attach(&self, parent: NodeId, child: NodeId) -> bool {
        child.0 != 0
            && child.0 < self.nodes.len()
            && parent.0 < self.nodes.len()
            && !self.contains(child, parent)
    }
}

impl Dom for Document {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn has_node(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        match self.kind(node) {
            Some(NodeKind::Element(data)) => Some(data.name.as_str()),
            _ => None,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match self.kind(node) {
            Some(NodeKind::Element(data)) => data
                .attrs
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match self.kind(node) {
            Some(NodeKind::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            name: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }))
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(data) = self.element_mut(node) else {
            return;
        };
        match data
            .attrs
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some(pos) => data.attrs[pos].1 = value.to_string(),
            None => data
                .attrs
                .push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(data) = self.element_mut(node) {
            data.attrs.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(Node {
            kind: NodeKind::Text(existing),
            ..
        }) = self.nodes.get_mut(node.0)
        {
            *existing = text.to_string();
        }
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.can_attach(parent, child) {
            log::warn!("Refusing to append {} under {}", child, parent);
            return;
        }
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        if reference == node || !self.can_attach(parent, node) {
            return;
        }
        self.detach(node);
        let siblings = &mut self.nodes[parent.0].children;
        let pos = siblings
            .iter()
            .position(|n| *n == reference)
            .unwrap_or(siblings.len());
        siblings.insert(pos, node);
        self.nodes[node.0].parent = Some(parent);
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        self.nodes[parent.0].children.retain(|n| *n != node);
        self.nodes[node.0].parent = None;
    }
}
