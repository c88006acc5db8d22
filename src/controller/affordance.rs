//! 切换控件（More / Less / All）
//! 控件 = 包裹元素（.more-link）+ 其中的链接；可能是页面预置的，也可能由部件生成
use truncation_engine::AffordanceLabel;

use crate::config::WidgetConfig;
use crate::dom::{Dom, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affordance {
    wrapper: NodeId,
    link: NodeId,
    /// 页面预置（部件运行前已存在）
    pre_existing: bool,
    /// 内嵌在内容流中（仅生成的控件）
    embedded: bool,
}

impl Affordance {
    /// 查找容器兄弟节点中预置的控件
    pub fn find_existing<D: Dom + ?Sized>(
        dom: &D,
        container: NodeId,
        widget: &WidgetConfig,
    ) -> Option<Self> {
        let wrapper = dom
            .siblings(container)
            .into_iter()
            .find(|n| dom.has_class(*n, &widget.more_link_class))?;

        let link = dom
            .descendants(wrapper)
            .into_iter()
            .find(|n| dom.tag_name(*n) == Some("a"));
        let Some(link) = link else {
            log::warn!(
                "Pre-existing .{} next to {} has no link, a new one will be created",
                widget.more_link_class,
                container
            );
            return None;
        };

        Some(Self {
            wrapper,
            link,
            pre_existing: true,
            embedded: false,
        })
    }

    /// 生成控件（尚未插入文档）
    /// 普通：<div class="more-link"><a class="truncate-reveal" href="#show-more">Read More</a></div>
    /// 内嵌：<span class="more-link">… <a ...>Read More</a></span>
    pub fn create<D: Dom + ?Sized>(dom: &mut D, widget: &WidgetConfig, embed: bool) -> Self {
        let wrapper = dom.create_element(if embed { "span" } else { "div" });
        dom.add_class(wrapper, &widget.more_link_class);

        let link = dom.create_element("a");
        dom.add_class(link, &widget.reveal_class());
        dom.set_attribute(link, "href", &widget.link_href);
        let label = dom.create_text(&widget.link_text);
        dom.append_child(link, label);
        dom.append_child(wrapper, link);

        let affordance = Self {
            wrapper,
            link,
            pre_existing: false,
            embedded: embed,
        };
        if embed {
            affordance.restore_ellipsis(dom, widget);
        }
        affordance
    }

    pub fn wrapper(&self) -> NodeId {
        self.wrapper
    }

    pub fn link(&self) -> NodeId {
        self.link
    }

    pub fn is_pre_existing(&self) -> bool {
        self.pre_existing
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// 事件目标是否落在控件内
    pub fn contains<D: Dom + ?Sized>(&self, dom: &D, node: NodeId) -> bool {
        dom.contains(self.wrapper, node)
    }

    /// 链接是否处于"可展开"视觉状态
    pub fn is_revealable<D: Dom + ?Sized>(&self, dom: &D, widget: &WidgetConfig) -> bool {
        dom.has_class(self.link, &widget.reveal_class())
    }

    pub fn set_revealable<D: Dom + ?Sized>(&self, dom: &mut D, widget: &WidgetConfig, on: bool) {
        if on {
            dom.add_class(self.link, &widget.reveal_class());
        } else {
            dom.remove_class(self.link, &widget.reveal_class());
        }
    }

    /// 替换链接文案中的状态关键词（只改第一个命中的文本节点，保留内部标记）
    pub fn set_label<D: Dom + ?Sized>(&self, dom: &mut D, label: AffordanceLabel) {
        let text_nodes = dom
            .descendants(self.link)
            .into_iter()
            .filter(|n| dom.text(*n).is_some())
            .collect::<Vec<_>>();

        for node in text_nodes {
            let relabeled = dom.text(node).and_then(|text| label.relabel(text));
            if let Some(text) = relabeled {
                dom.set_text(node, &text);
                return;
            }
        }
    }

    pub fn label<D: Dom + ?Sized>(&self, dom: &D) -> Option<AffordanceLabel> {
        AffordanceLabel::detect(&dom.text_content(self.link))
    }

    /// 自动展开期间隐藏控件
    pub fn suppress<D: Dom + ?Sized>(&self, dom: &mut D, widget: &WidgetConfig) {
        dom.add_class(self.wrapper, &widget.collapsed_class());
    }

    pub fn unsuppress<D: Dom + ?Sized>(&self, dom: &mut D, widget: &WidgetConfig) {
        dom.remove_class(self.wrapper, &widget.collapsed_class());
    }

    /// 去掉链接前的省略号文本
    pub fn strip_ellipsis<D: Dom + ?Sized>(&self, dom: &mut D) {
        for node in dom.child_nodes(self.wrapper) {
            if dom.text(node).is_some() {
                dom.detach(node);
            }
        }
    }

    /// 在链接前补回省略号文本（已存在则跳过）
    pub fn restore_ellipsis<D: Dom + ?Sized>(&self, dom: &mut D, widget: &WidgetConfig) {
        if dom.child_nodes(self.wrapper).iter().any(|n| dom.text(*n).is_some()) {
            return;
        }
        let prefix = dom.create_text(&format!("{} ", widget.ellipsis_text));
        dom.insert_before(self.link, prefix);
    }

    /// 移到目标元素末尾
    pub fn move_into<D: Dom + ?Sized>(&self, dom: &mut D, target: NodeId) {
        dom.append_child(target, self.wrapper);
    }

    pub fn remove<D: Dom + ?Sized>(self, dom: &mut D) {
        dom.detach(self.wrapper);
    }
}
