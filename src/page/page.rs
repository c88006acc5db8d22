//! 页面级入口
//! 核心职责：
//! 1. 初始化：扫描所有带 max-items / char-limit 属性的容器，逐个创建控制器
//! 2. 点击分发：按事件名过滤，路由到事件目标所属控件的控制器
//! 3. resize 分发：原始事件交给防抖监听器，结算后按注册顺序回调控制器
//!
//! 初始化只执行一次，之后新增的容器不会被处理
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::Instant;

use truncation_engine::ResizeWatcher;

use crate::config::{ContainerConfig, TapEvent, WidgetConfig};
use crate::controller::{TapOutcome, TruncationController};
use crate::dom::{Document, Dom, NodeId, Selector};
use crate::error::TruncateResult;

/// 初始化时的页面环境
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageEnvironment {
    pub viewport_width: u32,
    pub touch_capable: bool,
}

impl PageEnvironment {
    pub fn new(viewport_width: u32) -> Self {
        Self {
            viewport_width,
            touch_capable: false,
        }
    }

    pub fn with_touch(mut self, touch_capable: bool) -> Self {
        self.touch_capable = touch_capable;
        self
    }
}

#[derive(Debug)]
pub struct TruncationPage<D: Dom = Document> {
    dom: D,
    widget: Arc<WidgetConfig>,
    controllers: Vec<TruncationController>,
    by_container: FxHashMap<NodeId, usize>,
    watcher: ResizeWatcher<usize>,
    tap_event: TapEvent,
    viewport_width: u32,
    settled_ticks: usize,
}

impl<D: Dom> TruncationPage<D> {
    /// 初始化页面上所有截断容器
    pub fn init(dom: D, widget: WidgetConfig, env: PageEnvironment) -> TruncateResult<Self> {
        let widget = Arc::new(widget);
        let selector = Selector::parse(&widget.container_selector())?;
        let containers = dom
            .descendants(dom.root())
            .into_iter()
            .filter(|n| selector.matches(&dom, *n))
            .collect::<Vec<_>>();

        let mut page = Self {
            dom,
            watcher: ResizeWatcher::new(widget.quiet_period()),
            widget,
            controllers: Vec::with_capacity(containers.len()),
            by_container: FxHashMap::default(),
            tap_event: TapEvent::detect(env.touch_capable),
            viewport_width: env.viewport_width,
            settled_ticks: 0,
        };

        for container in containers {
            page.attach(container)?;
        }

        log::info!(
            "Truncation initialized | containers: {} | resize listeners: {} | tap event: {}",
            page.controllers.len(),
            page.watcher.len(),
            page.tap_event.name()
        );
        Ok(page)
    }

    /// 为单个容器创建控制器并进入初始状态
    fn attach(&mut self, container: NodeId) -> TruncateResult<()> {
        let Some(config) = ContainerConfig::from_element(&self.dom, container, &self.widget)? else {
            log::debug!("Skipping {}: no usable truncation limit", container);
            return Ok(());
        };

        let mut controller =
            TruncationController::new(&mut self.dom, container, config, Arc::clone(&self.widget))?;
        let id = self.controllers.len();

        if controller.wants_resize() {
            // 注册即以当前宽度回调一次
            self.watcher.register(id, self.viewport_width);
            controller.on_viewport(&mut self.dom, self.viewport_width);
        } else {
            controller.hide(&mut self.dom);
        }

        self.by_container.insert(container, id);
        self.controllers.push(controller);
        Ok(())
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn into_dom(self) -> D {
        self.dom
    }

    pub fn widget(&self) -> &WidgetConfig {
        &self.widget
    }

    pub fn controllers(&self) -> &[TruncationController] {
        &self.controllers
    }

    pub fn controller_for(&self, container: NodeId) -> Option<&TruncationController> {
        self.by_container
            .get(&container)
            .and_then(|id| self.controllers.get(*id))
    }

    pub fn tap_event(&self) -> TapEvent {
        self.tap_event
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    /// 已结算的 resize 突发次数
    pub fn settled_ticks(&self) -> usize {
        self.settled_ticks
    }

    /// 点击事件分发；目标句柄不属于本文档时返回 UnknownNode
    pub fn tap(&mut self, target: NodeId, event: &str) -> TruncateResult<TapOutcome> {
        let target = self.dom.check(target)?;
        if event != self.tap_event.name() {
            return Ok(TapOutcome::Ignored);
        }
        let Some(controller) = self
            .controllers
            .iter_mut()
            .find(|c| c.owns(&self.dom, target))
        else {
            return Ok(TapOutcome::Ignored);
        };

        let outcome = controller.toggle(&mut self.dom);
        log::debug!("Tap on {} for {} -> {:?}", target, controller.container(), outcome);
        Ok(outcome)
    }

    /// 记录原始 resize 事件
    pub fn resize(&mut self, width: u32, now: Instant) {
        self.watcher.record(width, now);
    }

    /// 防抖截止时间
    pub fn deadline(&self) -> Option<Instant> {
        self.watcher.deadline()
    }

    /// 到期结算并回调控制器，返回被回调的控制器数量
    pub fn poll(&mut self, now: Instant) -> usize {
        let Some(tick) = self.watcher.poll(now) else {
            return 0;
        };
        self.settled_ticks += 1;
        self.viewport_width = tick.width;

        for id in &tick.keys {
            if let Some(controller) = self.controllers.get_mut(*id) {
                controller.on_viewport(&mut self.dom, tick.width);
            }
        }
        tick.keys.len()
    }
}
