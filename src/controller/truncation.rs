//! 截断控制器：单个容器的可见性状态机
//! 核心职责：
//! 1. hidden / shown 两态切换，重复进入同一状态为空操作
//! 2. 管理切换控件的生命周期（生成、改文案、内嵌位置迁移、移除、惰性化）
//! 3. no-more 模式下改用省略号标记
//! 4. 响应视口宽度变化（自动展开阈值）
//!
//! 点击处理不做事件解绑：控件是否响应由 armed / suppressed 两个标志守卫
use std::sync::Arc;

use truncation_engine::{AffordanceLabel, TruncationState};

use crate::config::{ContainerConfig, TruncationMode, WidgetConfig};
use crate::controller::{Affordance, CollapseTargets};
use crate::dom::{Dom, NodeId};
use crate::error::TruncateResult;

/// 点击处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    Revealed,
    Hidden,
    /// 控件惰性 / 被抑制 / 目标不属于任何控件：不拦截默认行为
    Ignored,
}

impl TapOutcome {
    /// 是否阻止链接默认跳转
    pub fn default_prevented(self) -> bool {
        !matches!(self, TapOutcome::Ignored)
    }
}

#[derive(Debug, Clone)]
pub struct TruncationController {
    container: NodeId,
    config: ContainerConfig,
    widget: Arc<WidgetConfig>,
    targets: CollapseTargets,
    affordance: Option<Affordance>,
    ellipsis: Option<NodeId>,
    /// 最近一次实际应用的状态；None 表示尚未应用过
    applied: Option<TruncationState>,
    /// 控件是否响应点击
    armed: bool,
    /// 自动展开期间控件被隐藏
    suppressed: bool,
}

impl TruncationController {
    /// 创建控制器：计算折叠目标、识别预置控件；不改变可见性
    pub fn new<D: Dom + ?Sized>(
        dom: &mut D,
        container: NodeId,
        config: ContainerConfig,
        widget: Arc<WidgetConfig>,
    ) -> TruncateResult<Self> {
        let targets = CollapseTargets::prepare(dom, container, &config, &widget)?;
        let affordance = Affordance::find_existing(dom, container, &widget);

        Ok(Self {
            container,
            config,
            widget,
            targets,
            affordance,
            ellipsis: None,
            applied: None,
            armed: false,
            suppressed: false,
        })
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn targets(&self) -> &CollapseTargets {
        &self.targets
    }

    pub fn affordance(&self) -> Option<&Affordance> {
        self.affordance.as_ref()
    }

    pub fn ellipsis(&self) -> Option<NodeId> {
        self.ellipsis
    }

    /// 当前状态（尚未应用时视为 hidden）
    pub fn state(&self) -> TruncationState {
        self.applied.unwrap_or_default()
    }

    /// 条目模式下子元素数量未超过上限
    fn has_nothing_to_reveal(&self) -> bool {
        matches!(self.config.mode, TruncationMode::MaxItems(_)) && self.targets.is_empty()
    }

    /// 是否需要监听视口宽度
    pub fn wants_resize(&self) -> bool {
        self.config.auto_display.is_some()
    }

    /// 控件当前能否响应点击
    pub fn is_interactive(&self) -> bool {
        self.affordance.is_some() && self.armed && !self.suppressed
    }

    /// 事件目标是否属于本控制器的控件
    pub fn owns<D: Dom + ?Sized>(&self, dom: &D, target: NodeId) -> bool {
        self.affordance
            .as_ref()
            .map_or(false, |a| a.contains(dom, target))
    }

    /// 折叠
    pub fn hide<D: Dom + ?Sized>(&mut self, dom: &mut D) {
        if self.applied == Some(TruncationState::Hidden) {
            return;
        }

        let collapsed = self.widget.collapsed_class();
        for node in self.targets.collapsible() {
            dom.add_class(node, &collapsed);
        }

        if self.has_nothing_to_reveal() {
            // 条目数未超过上限：不生成控件 / 省略号
            log::debug!("{} has no items beyond the limit, skipping affordance", self.container);
        } else if self.config.no_more {
            self.insert_ellipsis(dom);
        } else {
            self.enter_hidden_affordance(dom);
        }

        self.applied = Some(TruncationState::Hidden);
        log::debug!(
            "{} hidden | collapsed nodes: {}",
            self.container,
            self.targets.excluded.len() + usize::from(self.targets.span.is_some())
        );
    }

    /// 用户展开
    pub fn reveal<D: Dom + ?Sized>(&mut self, dom: &mut D) {
        self.reveal_with(dom, false);
    }

    /// 点击控件：根据链接当前视觉状态决定展开或折叠
    pub fn toggle<D: Dom + ?Sized>(&mut self, dom: &mut D) -> TapOutcome {
        if !self.is_interactive() {
            return TapOutcome::Ignored;
        }
        let revealable = self
            .affordance
            .as_ref()
            .map_or(false, |a| a.is_revealable(dom, &self.widget));

        if revealable {
            self.reveal(dom);
            TapOutcome::Revealed
        } else {
            self.hide(dom);
            TapOutcome::Hidden
        }
    }

    /// 视口宽度结算回调
    pub fn on_viewport<D: Dom + ?Sized>(&mut self, dom: &mut D, width: u32) {
        if self.config.auto_displays_at(width) {
            log::debug!("{} auto-displayed at {}px", self.container, width);
            self.reveal_with(dom, true);
        } else {
            self.hide(dom);
        }
    }

    fn reveal_with<D: Dom + ?Sized>(&mut self, dom: &mut D, auto: bool) {
        if self.applied != Some(TruncationState::Shown) {
            let collapsed = self.widget.collapsed_class();
            for node in self.targets.collapsible() {
                dom.remove_class(node, &collapsed);
            }

            if self.config.no_more {
                if let Some(ellipsis) = self.ellipsis.take() {
                    dom.detach(ellipsis);
                }
            } else {
                self.enter_shown_affordance(dom);
            }

            self.applied = Some(TruncationState::Shown);
            log::debug!("{} shown", self.container);
        }

        if auto {
            if let Some(affordance) = &self.affordance {
                affordance.suppress(dom, &self.widget);
                self.suppressed = true;
            }
        }
    }

    /// 进入折叠态的控件处理：首次生成，之后恢复为"可展开"
    fn enter_hidden_affordance<D: Dom + ?Sized>(&mut self, dom: &mut D) {
        match &self.affordance {
            None => {
                let affordance = Affordance::create(dom, &self.widget, self.config.embed);
                self.place_new(dom, &affordance);
                self.affordance = Some(affordance);
            }
            Some(affordance) => {
                affordance.unsuppress(dom, &self.widget);
                affordance.set_revealable(dom, &self.widget, true);
                affordance.set_label(dom, AffordanceLabel::More);
                if affordance.is_embedded() {
                    affordance.restore_ellipsis(dom, &self.widget);
                    if let Some(target) = self.targets.last_visible {
                        affordance.move_into(dom, target);
                    }
                }
            }
        }
        self.armed = true;
        self.suppressed = false;
    }

    /// 进入展开态的控件处理
    fn enter_shown_affordance<D: Dom + ?Sized>(&mut self, dom: &mut D) {
        let Some(affordance) = self.affordance.take() else {
            return;
        };

        if self.config.collapsible {
            // 可再次折叠：改为 "Less"，内嵌控件移到末尾并去掉省略号
            affordance.set_revealable(dom, &self.widget, false);
            affordance.set_label(dom, AffordanceLabel::Less);
            if affordance.is_embedded() {
                affordance.strip_ellipsis(dom);
                if let Some(target) = self.targets.last_child() {
                    affordance.move_into(dom, target);
                }
            }
            self.affordance = Some(affordance);
            self.armed = true;
        } else if !affordance.is_pre_existing() {
            // 一次性展开：生成的控件直接移除
            affordance.remove(dom);
            self.armed = false;
        } else {
            // 预置控件保留为惰性 "All"
            affordance.set_revealable(dom, &self.widget, false);
            affordance.set_label(dom, AffordanceLabel::All);
            self.affordance = Some(affordance);
            self.armed = false;
        }
    }

    /// 生成控件的插入位置
    fn place_new<D: Dom + ?Sized>(&self, dom: &mut D, affordance: &Affordance) {
        match (affordance.is_embedded(), self.targets.last_visible) {
            (true, Some(target)) => affordance.move_into(dom, target),
            _ => {
                let host = non_list_host(dom, self.container);
                dom.append_child(host, affordance.wrapper());
            }
        }
    }

    /// no-more 模式：在最后可见内容旁插入省略号
    fn insert_ellipsis<D: Dom + ?Sized>(&mut self, dom: &mut D) {
        if self.ellipsis.is_some() {
            return;
        }
        let ellipsis = dom.create_element("span");
        dom.add_class(ellipsis, &self.widget.ellipsis_class());
        let text = dom.create_text(&self.widget.ellipsis_text);
        dom.append_child(ellipsis, text);

        match (self.targets.span, self.config.embed, self.targets.last_visible) {
            (Some(span), _, _) => dom.insert_before(span, ellipsis),
            (None, true, Some(target)) => dom.append_child(target, ellipsis),
            _ => dom.insert_after(self.container, ellipsis),
        }
        self.ellipsis = Some(ellipsis);
    }
}

/// 容器自身或最近的非列表祖先（ol / ul / dl 不能直接挂控件）
fn non_list_host<D: Dom + ?Sized>(dom: &D, container: NodeId) -> NodeId {
    let mut current = container;
    while matches!(dom.tag_name(current), Some("ol" | "ul" | "dl")) {
        match dom.parent(current) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseMode;
    use crate::dom::Document;

    fn controller(html: &str) -> (Document, TruncationController) {
        let mut doc = Document::parse(html).unwrap();
        let widget = Arc::new(WidgetConfig::builder().parse_mode(ParseMode::Strict).build());
        let container = doc.select(&widget.container_selector()).unwrap()[0];
        let config = ContainerConfig::from_element(&doc, container, &widget)
            .unwrap()
            .unwrap();
        let ctrl = TruncationController::new(&mut doc, container, config, widget).unwrap();
        (doc, ctrl)
    }

    fn collapsed_count(doc: &Document) -> usize {
        doc.select(".truncate-collapsed").unwrap().len()
    }

    const FIVE_ITEMS: &str = r#"<section data-truncate-max-items="2"><p>1</p><p>2</p><p>3</p><p>4</p><p>5</p></section>"#;

    #[test]
    fn test_one_shot_reveal_removes_generated_link() {
        // 测试场景：5 个子元素，保留 2 个，不可折叠，无预置控件
        let (mut doc, mut ctrl) = controller(FIVE_ITEMS);
        ctrl.hide(&mut doc);

        assert_eq!(collapsed_count(&doc), 3);
        let link = ctrl.affordance().unwrap().link();
        assert_eq!(doc.text_content(link), "Read More");
        assert_eq!(ctrl.state(), TruncationState::Hidden);

        let outcome = ctrl.toggle(&mut doc);
        assert_eq!(outcome, TapOutcome::Revealed);
        assert!(outcome.default_prevented());
        assert_eq!(collapsed_count(&doc), 0);
        assert!(ctrl.affordance().is_none());
        assert!(doc.select(".more-link").unwrap().is_empty());
        assert_eq!(ctrl.toggle(&mut doc), TapOutcome::Ignored);
    }

    #[test]
    fn test_collapsible_round_trip_restores_collapsed_set() {
        let (mut doc, mut ctrl) = controller(
            r#"<section data-truncate-max-items="2" data-truncate-collapsible><p>1</p><p>2</p><p>3</p><p>4</p></section>"#,
        );
        ctrl.hide(&mut doc);
        let initial = doc.select(".truncate-collapsed").unwrap();

        assert_eq!(ctrl.toggle(&mut doc), TapOutcome::Revealed);
        let link = ctrl.affordance().unwrap().link();
        assert_eq!(doc.text_content(link), "Read Less");
        assert!(!doc.has_class(link, "truncate-reveal"));

        assert_eq!(ctrl.toggle(&mut doc), TapOutcome::Hidden);
        assert_eq!(doc.select(".truncate-collapsed").unwrap(), initial);
        assert_eq!(doc.text_content(link), "Read More");
        assert_eq!(ctrl.state(), TruncationState::Hidden);
    }

    #[test]
    fn test_hide_and_reveal_are_idempotent() {
        let (mut doc, mut ctrl) = controller(FIVE_ITEMS);
        ctrl.hide(&mut doc);
        let snapshot = doc.to_html();
        ctrl.hide(&mut doc);
        assert_eq!(doc.to_html(), snapshot);

        ctrl.reveal(&mut doc);
        let snapshot = doc.to_html();
        ctrl.reveal(&mut doc);
        assert_eq!(doc.to_html(), snapshot);
    }

    #[test]
    fn test_pre_existing_link_becomes_inert_all() {
        // 测试场景：预置控件，展开后改为 "All" 且不再响应
        let (mut doc, mut ctrl) = controller(
            r##"<div><section data-truncate-max-items="1"><p>1</p><p>2</p></section><div class="more-link"><a href="#all">View All</a></div></div>"##,
        );
        ctrl.hide(&mut doc);
        let link = ctrl.affordance().unwrap().link();
        assert_eq!(doc.text_content(link), "View More");
        assert!(doc.has_class(link, "truncate-reveal"));
        assert_eq!(doc.select(".more-link").unwrap().len(), 1);

        assert_eq!(ctrl.toggle(&mut doc), TapOutcome::Revealed);
        assert_eq!(doc.text_content(link), "View All");
        assert!(!doc.has_class(link, "truncate-reveal"));
        assert_eq!(ctrl.toggle(&mut doc), TapOutcome::Ignored);
        assert!(!TapOutcome::Ignored.default_prevented());
    }

    #[test]
    fn test_list_container_appends_link_to_parent() {
        let (mut doc, mut ctrl) = controller(
            r#"<div id="host"><ul data-truncate-max-items="1"><li>a</li><li>b</li></ul></div>"#,
        );
        ctrl.hide(&mut doc);
        let host = doc.select_first("#host").unwrap().unwrap();
        let wrapper = ctrl.affordance().unwrap().wrapper();
        assert_eq!(doc.parent(wrapper), Some(host));
    }

    #[test]
    fn test_embedded_link_moves_on_reveal() {
        // 测试场景：内嵌控件折叠时位于最后可见子元素内，展开后移到最后一个子元素并去掉省略号
        let (mut doc, mut ctrl) = controller(
            r#"<div data-truncate-max-items="1" data-truncate-embed data-truncate-collapsible><p>a</p><p>b</p></div>"#,
        );
        ctrl.hide(&mut doc);
        let paragraphs = doc.select("p").unwrap();
        let wrapper = ctrl.affordance().unwrap().wrapper();
        assert_eq!(doc.parent(wrapper), Some(paragraphs[0]));
        assert_eq!(doc.text_content(wrapper), "\u{2026} Read More");

        ctrl.toggle(&mut doc);
        assert_eq!(doc.parent(wrapper), Some(paragraphs[1]));
        assert_eq!(doc.text_content(wrapper), "Read Less");

        ctrl.toggle(&mut doc);
        assert_eq!(doc.parent(wrapper), Some(paragraphs[0]));
        assert_eq!(doc.text_content(wrapper), "\u{2026} Read More");
    }

    #[test]
    fn test_no_more_uses_ellipsis() {
        let (mut doc, mut ctrl) = controller(
            r#"<div data-truncate-char-limit="20" data-truncate-no-more><p>The quick brown fox jumps</p></div>"#,
        );
        ctrl.hide(&mut doc);
        assert!(ctrl.affordance().is_none());
        let p = doc.select_first("p").unwrap().unwrap();
        assert_eq!(
            doc.inner_html(p),
            "The quick brown fox<span class=\"truncate-ellipsis\">\u{2026}</span><span class=\"truncate-truncated truncate-collapsed\"> jumps</span>"
        );

        ctrl.reveal(&mut doc);
        assert_eq!(
            doc.inner_html(p),
            r#"The quick brown fox<span class="truncate-truncated"> jumps</span>"#
        );
        assert_eq!(ctrl.toggle(&mut doc), TapOutcome::Ignored);
    }

    #[test]
    fn test_auto_display_suppresses_and_restores() {
        // 测试场景：宽屏自动展开隐藏控件，窄屏恢复折叠
        let (mut doc, mut ctrl) = controller(
            r#"<div><section data-truncate-max-items="1" data-truncate-auto-display="768" data-truncate-collapsible><p>1</p><p>2</p></section></div>"#,
        );
        ctrl.on_viewport(&mut doc, 1024);
        assert_eq!(ctrl.state(), TruncationState::Shown);
        assert!(ctrl.affordance().is_none());
        assert_eq!(collapsed_count(&doc), 0);

        ctrl.on_viewport(&mut doc, 500);
        assert_eq!(ctrl.state(), TruncationState::Hidden);
        assert_eq!(collapsed_count(&doc), 1);
        assert!(ctrl.is_interactive());

        ctrl.on_viewport(&mut doc, 900);
        assert_eq!(ctrl.state(), TruncationState::Shown);
        let wrapper = ctrl.affordance().unwrap().wrapper();
        assert!(doc.has_class(wrapper, "truncate-collapsed"));
        assert_eq!(ctrl.toggle(&mut doc), TapOutcome::Ignored);

        ctrl.on_viewport(&mut doc, 600);
        assert!(!doc.has_class(wrapper, "truncate-collapsed"));
        assert_eq!(ctrl.toggle(&mut doc), TapOutcome::Revealed);
    }

    #[test]
    fn test_items_within_limit_get_no_affordance() {
        // 测试场景：子元素数量未超过上限，不生成 "Read More"
        let (mut doc, mut ctrl) = controller(
            r#"<div><ul data-truncate-max-items="3"><li>a</li><li>b</li></ul></div>"#,
        );
        ctrl.hide(&mut doc);
        assert_eq!(ctrl.state(), TruncationState::Hidden);
        assert!(ctrl.affordance().is_none());
        assert_eq!(doc.to_html(), r#"<div><ul data-truncate-max-items="3"><li>a</li><li>b</li></ul></div>"#);
        assert_eq!(ctrl.toggle(&mut doc), TapOutcome::Ignored);

        let (mut doc, mut ctrl) = controller(
            r#"<section data-truncate-max-items="2" data-truncate-no-more><p>1</p><p>2</p></section>"#,
        );
        ctrl.hide(&mut doc);
        assert_eq!(ctrl.ellipsis(), None);
        assert!(doc.select(".truncate-ellipsis").unwrap().is_empty());
    }

    #[test]
    fn test_no_more_ellipsis_follows_container() {
        // 测试场景：条目模式无截断文本，省略号插在容器之后，展开时移除
        let (mut doc, mut ctrl) = controller(
            r#"<div><section data-truncate-max-items="1" data-truncate-no-more><p>1</p><p>2</p></section></div>"#,
        );
        ctrl.hide(&mut doc);
        let section = ctrl.container();
        let ellipsis = ctrl.ellipsis().unwrap();
        assert_eq!(doc.next_sibling(section), Some(ellipsis));
        assert_eq!(doc.text_content(ellipsis), "\u{2026}");
        assert!(ctrl.affordance().is_none());

        ctrl.reveal(&mut doc);
        assert_eq!(ctrl.ellipsis(), None);
        assert_eq!(doc.parent(ellipsis), None);
        assert!(doc.select(".truncate-ellipsis").unwrap().is_empty());
    }

    #[test]
    fn test_no_more_embedded_ellipsis_goes_into_last_visible() {
        let (mut doc, mut ctrl) = controller(
            r#"<section data-truncate-max-items="1" data-truncate-no-more data-truncate-embed><p>1</p><p>2</p></section>"#,
        );
        ctrl.hide(&mut doc);
        let paragraphs = doc.select("p").unwrap();
        let ellipsis = ctrl.ellipsis().unwrap();
        assert_eq!(doc.parent(ellipsis), Some(paragraphs[0]));
        assert_eq!(
            doc.inner_html(paragraphs[0]),
            "1<span class=\"truncate-ellipsis\">\u{2026}</span>"
        );
    }

    #[test]
    fn test_char_limit_ignores_excluded_children() {
        // 测试场景：排除项既不计入预算也不折叠
        let (mut doc, mut ctrl) = controller(
            r#"<div data-truncate-char-limit="10" data-truncate-exclude=".entry-meta"><p>Hello</p><p class="entry-meta">A very long meta line here</p><p>big world</p><p>after</p></div>"#,
        );
        ctrl.hide(&mut doc);

        let meta = doc.select_first(".entry-meta").unwrap().unwrap();
        assert!(!doc.has_class(meta, "truncate-collapsed"));
        assert!(!ctrl.targets().children.contains(&meta));

        let span = ctrl.targets().span.unwrap();
        assert_eq!(doc.text_content(span), " world");
        let collapsed = doc
            .select(".truncate-collapsed")
            .unwrap()
            .into_iter()
            .map(|n| doc.text_content(n))
            .collect::<Vec<_>>();
        assert_eq!(collapsed, vec![" world", "after"]);

        ctrl.reveal(&mut doc);
        assert_eq!(collapsed_count(&doc), 0);
    }

    #[test]
    fn test_pre_existing_affordance_follows_auto_display() {
        // 测试场景：预置控件在宽屏下被隐藏，窄屏下恢复为 "More" 并可展开
        let (mut doc, mut ctrl) = controller(
            r##"<div><section data-truncate-max-items="1" data-truncate-auto-display="768"><p>1</p><p>2</p></section><div class="more-link"><a href="#all">View All</a></div></div>"##,
        );
        ctrl.on_viewport(&mut doc, 1024);
        assert_eq!(ctrl.state(), TruncationState::Shown);
        let affordance = ctrl.affordance().unwrap().clone();
        assert!(affordance.is_pre_existing());
        assert!(doc.has_class(affordance.wrapper(), "truncate-collapsed"));
        assert_eq!(ctrl.toggle(&mut doc), TapOutcome::Ignored);

        ctrl.on_viewport(&mut doc, 500);
        assert_eq!(ctrl.state(), TruncationState::Hidden);
        assert!(!doc.has_class(affordance.wrapper(), "truncate-collapsed"));
        assert_eq!(doc.text_content(affordance.link()), "View More");
        assert!(doc.has_class(affordance.link(), "truncate-reveal"));

        assert_eq!(ctrl.toggle(&mut doc), TapOutcome::Revealed);
        assert_eq!(doc.text_content(affordance.link()), "View All");
        assert_eq!(ctrl.toggle(&mut doc), TapOutcome::Ignored);
    }
}
