//! 折叠目标计算
//! 核心职责：
//! 1. 计算子元素集合（排除选择器命中项与已有的切换控件）
//! 2. 条目模式：跳过前 N 个，其余全部折叠
//! 3. 字符模式：运行文本切分器，在切分点子元素内按字符偏移包裹尾部文本
use truncation_engine::TextSplitter;

use crate::config::{ContainerConfig, TruncationMode, WidgetConfig};
use crate::dom::{Dom, NodeId};
use crate::error::TruncateResult;

/// 单个容器的折叠目标（初始化后固定，不随展开 / 折叠重新计算）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseTargets {
    /// 子元素集合（文档顺序）
    pub children: Vec<NodeId>,
    /// 超出上限、折叠时隐藏的子元素
    pub excluded: Vec<NodeId>,
    /// 截断文本包裹节点
    pub span: Option<NodeId>,
    /// 折叠状态下最后一个可见子元素
    pub last_visible: Option<NodeId>,
}

impl CollapseTargets {
    /// 折叠时需要加标记类的全部节点
    pub fn collapsible(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.excluded.iter().copied().chain(self.span)
    }

    /// 无任何可折叠内容
    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty() && self.span.is_none()
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.children.last().copied()
    }

    /// 计算容器的折叠目标；字符模式下会修改 DOM（拆分文本并插入包裹节点）
    pub fn prepare<D: Dom + ?Sized>(
        dom: &mut D,
        container: NodeId,
        config: &ContainerConfig,
        widget: &WidgetConfig,
    ) -> TruncateResult<Self> {
        let children = child_set(dom, container, config, widget);

        let targets = match config.mode {
            TruncationMode::MaxItems(max_items) => {
                let excluded = children.iter().skip(max_items).copied().collect::<Vec<_>>();
                let last_visible = match max_items.min(children.len()) {
                    0 => None,
                    n => Some(children[n - 1]),
                };
                Self {
                    children,
                    excluded,
                    span: None,
                    last_visible,
                }
            }
            TruncationMode::CharLimit(limit) => {
                let splitter = TextSplitter::new(limit)?;
                let texts = children
                    .iter()
                    .map(|child| dom.text_content(*child))
                    .collect::<Vec<_>>();
                let plan = splitter.plan(&texts);

                let excluded = plan.excluded().map(|i| children[i]).collect::<Vec<_>>();
                let span = match plan.wrapped() {
                    Some(point) => {
                        let offset = point.cut_offset.unwrap_or_default();
                        wrap_tail(dom, children[point.child], offset, &widget.truncated_class())
                    }
                    None => None,
                };
                let last_visible = match &plan.split {
                    Some(point) => Some(children[point.child]),
                    None => children.last().copied(),
                };
                Self {
                    children,
                    excluded,
                    span,
                    last_visible,
                }
            }
        };

        log::debug!(
            "Collapse targets for {} | children: {} | excluded: {} | span: {}",
            container,
            targets.children.len(),
            targets.excluded.len(),
            targets.span.is_some()
        );
        Ok(targets)
    }
}

/// 子元素集合：直接子元素，去掉排除选择器命中项和切换控件
pub fn child_set<D: Dom + ?Sized>(
    dom: &D,
    container: NodeId,
    config: &ContainerConfig,
    widget: &WidgetConfig,
) -> Vec<NodeId> {
    dom.children(container)
        .into_iter()
        .filter(|child| !dom.has_class(*child, &widget.more_link_class))
        .filter(|child| {
            config
                .exclude
                .as_ref()
                .map_or(true, |selector| !selector.matches(dom, *child))
        })
        .collect()
}

/// 在子元素文本的字符偏移处开始包裹，直到子元素末尾
/// 偏移落在直接文本子节点内：拆分该文本节点；
/// 落在嵌套的行内元素内：从该元素整体开始包裹（只会少保留，不会多保留）
pub fn wrap_tail<D: Dom + ?Sized>(
    dom: &mut D,
    child: NodeId,
    offset: usize,
    class: &str,
) -> Option<NodeId> {
    let start = wrap_start(dom, child, offset)?;

    let span = dom.create_element("span");
    dom.add_class(span, class);
    dom.insert_before(start, span);

    let siblings = dom.child_nodes(child);
    let pos = siblings.iter().position(|n| *n == start)?;
    for node in &siblings[pos..] {
        dom.append_child(span, *node);
    }
    Some(span)
}

/// 定位包裹起点（子元素的直接子节点）
fn wrap_start<D: Dom + ?Sized>(dom: &mut D, child: NodeId, offset: usize) -> Option<NodeId> {
    let text_nodes = dom
        .descendants(child)
        .into_iter()
        .filter(|n| dom.text(*n).is_some())
        .collect::<Vec<_>>();

    let mut consumed = 0usize;
    for text_node in text_nodes {
        let len = dom.text(text_node).map_or(0, |t| t.chars().count());
        if offset < consumed + len {
            let local = offset - consumed;
            let top = top_level(dom, child, text_node)?;
            if top != text_node || local == 0 {
                return Some(top);
            }
            return Some(dom.split_text(text_node, local).unwrap_or(text_node));
        }
        consumed += len;
    }
    // 偏移位于文本末尾：无需包裹
    None
}

/// node 在 child 下的顶层祖先（child 的直接子节点）
fn top_level<D: Dom + ?Sized>(dom: &D, child: NodeId, node: NodeId) -> Option<NodeId> {
    let mut current = node;
    loop {
        let parent = dom.parent(current)?;
        if parent == child {
            return Some(current);
        }
        current = parent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseMode;
    use crate::dom::Document;

    fn prepare(html: &str) -> (Document, NodeId, CollapseTargets) {
        let mut doc = Document::parse(html).unwrap();
        let widget = WidgetConfig::builder().parse_mode(ParseMode::Strict).build();
        let container = doc.children(doc.root())[0];
        let config = ContainerConfig::from_element(&doc, container, &widget)
            .unwrap()
            .unwrap();
        let targets = CollapseTargets::prepare(&mut doc, container, &config, &widget).unwrap();
        (doc, container, targets)
    }

    #[test]
    fn test_max_items_with_exclusions() {
        // 测试场景：排除项不计数、不折叠
        let (doc, _, targets) = prepare(
            r#"<section data-truncate-max-items="2" data-truncate-exclude=".entry-meta"><p>1</p><p class="entry-meta">m</p><p>2</p><p>3</p><p class="entry-meta">m</p><p>4</p></section>"#,
        );
        assert_eq!(targets.children.len(), 4);
        let texts = targets
            .excluded
            .iter()
            .map(|n| doc.text_content(*n))
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["3", "4"]);
        assert_eq!(targets.last_visible.map(|n| doc.text_content(n)), Some("2".to_string()));
    }

    #[test]
    fn test_more_link_children_are_skipped() {
        let (_, _, targets) = prepare(
            r##"<div data-truncate-max-items="1"><p>a</p><p>b</p><div class="more-link"><a href="#">Read More</a></div></div>"##,
        );
        assert_eq!(targets.children.len(), 2);
        assert_eq!(targets.excluded.len(), 1);
    }

    #[test]
    fn test_char_limit_wraps_tail() {
        // 测试场景：20 字符预算，尾部 " jumps" 被包裹
        let (doc, container, targets) =
            prepare(r#"<div data-truncate-char-limit="20"><p>The quick brown fox jumps</p></div>"#);
        let span = targets.span.unwrap();
        assert_eq!(doc.text_content(span), " jumps");
        assert!(targets.excluded.is_empty());
        assert_eq!(
            doc.inner_html(container),
            r#"<p>The quick brown fox<span class="truncate-truncated"> jumps</span></p>"#
        );
    }

    #[test]
    fn test_char_limit_nested_markup_is_conservative() {
        // 测试场景：切分点落在 <em> 内部，从 <em> 整体开始包裹
        let (doc, container, targets) = prepare(
            r#"<div data-truncate-char-limit="12"><p>Hello <em>brave new</em> world</p><p>after</p></div>"#,
        );
        assert_eq!(targets.excluded.len(), 1);
        assert_eq!(doc.text_content(targets.span.unwrap()), "brave new world");
        assert_eq!(
            doc.inner_html(container),
            r#"<p>Hello <span class="truncate-truncated"><em>brave new</em> world</span></p><p>after</p>"#
        );
    }

    #[test]
    fn test_char_limit_counts_indentation() {
        // 测试场景：连续空白计入预算，10 字符预算只保留 "aa"
        let html = format!(
            r#"<div data-truncate-char-limit="10"><p>aa{}bb cc dd ee</p></div>"#,
            " ".repeat(20)
        );
        let (doc, container, targets) = prepare(&html);
        let span = targets.span.unwrap();
        assert_eq!(doc.text_content(span), format!("{}bb cc dd ee", " ".repeat(20)));
        let p = doc.children(container)[0];
        assert_eq!(doc.text(doc.child_nodes(p)[0]), Some("aa"));
    }

    #[test]
    fn test_char_limit_covers_everything() {
        let (_, _, targets) =
            prepare(r#"<div data-truncate-char-limit="100"><p>short</p><p>text</p></div>"#);
        assert!(targets.is_empty());
    }
}
