//! 视口宽度防抖监听器
//! 核心职责：
//! 1. 将高频 resize 事件收敛为低频的"宽度确实变化"通知
//! 2. 经典防抖：静默期内的新事件取消并重启计时
//! 3. 宽度未变化（仅高度变化触发的 resize）时跳过通知
//!
//! 监听器只保存调用方的 key（弱回引用），不持有控制器本身；
//! 时间由调用方注入，便于在同步代码与 tokio 定时器之间复用。

use std::time::{Duration, Instant};

/// 默认静默期（50ms）
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(50);

/// 单个注册项：key + 最近一次通知时的宽度
#[derive(Debug, Clone)]
struct Registration<K> {
    key: K,
    last_width: u32,
}

/// 尚未结算的 resize 突发
#[derive(Debug, Clone, Copy)]
struct PendingResize {
    width: u32,
    deadline: Instant,
}

/// 一次结算结果：结算宽度 + 需要回调的 key（按注册顺序）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledTick<K> {
    pub width: u32,
    pub keys: Vec<K>,
}

/// 防抖监听器
#[derive(Debug, Clone)]
pub struct ResizeWatcher<K> {
    registrations: Vec<Registration<K>>,
    pending: Option<PendingResize>,
    quiet_period: Duration,
}

impl<K: Clone> Default for ResizeWatcher<K> {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl<K: Clone> ResizeWatcher<K> {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            registrations: Vec::new(),
            pending: None,
            quiet_period,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// 注册监听 key，记录基线宽度
    /// 调用方需立即以 `width` 调用一次对应回调（建立基线）
    pub fn register(&mut self, key: K, width: u32) {
        self.registrations.push(Registration {
            key,
            last_width: width,
        });
        log::debug!(
            "Resize listener registered | total: {} | baseline width: {}px",
            self.registrations.len(),
            width
        );
    }

    /// 记录一次原始 resize 事件，重启静默期计时
    pub fn record(&mut self, width: u32, now: Instant) {
        let deadline = now + self.quiet_period;
        if self.pending.is_some() {
            log::trace!("Resize burst continues, debounce rearmed at width {}px", width);
        }
        self.pending = Some(PendingResize { width, deadline });
    }

    /// 当前待结算的截止时间（无突发时为 None）
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    /// 到期则结算：返回宽度发生变化的 key 列表
    /// 未到期或无待结算事件返回 None；到期但无宽度变化返回空 keys
    pub fn poll(&mut self, now: Instant) -> Option<SettledTick<K>> {
        let pending = self.pending?;
        if now < pending.deadline {
            return None;
        }
        self.pending = None;

        let width = pending.width;
        let keys = self
            .registrations
            .iter_mut()
            .filter(|reg| reg.last_width != width)
            .map(|reg| {
                reg.last_width = width;
                reg.key.clone()
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Resize settled at {}px | notified {}/{} listeners",
            width,
            keys.len(),
            self.registrations.len()
        );
        Some(SettledTick { width, keys })
    }
}
