//! 异步驱动（tokio）
//! 把宿主的 resize / 点击事件经由通道喂给页面，防抖截止时间由 `sleep_until` 等待
//! 通道关闭时先结算尚未到期的 resize 突发，再返回页面
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep_until, Instant};

use crate::dom::{Dom, NodeId};
use crate::page::TruncationPage;

/// 宿主事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// 视口宽度变化（原始事件，未防抖）
    Resize(u32),
    /// 点击 / 触摸结束
    Tap { target: NodeId, event: String },
}

/// 事件循环：直到通道关闭
pub async fn drive<D: Dom>(
    mut page: TruncationPage<D>,
    mut events: UnboundedReceiver<PageEvent>,
) -> TruncationPage<D> {
    loop {
        let deadline = page.deadline();
        let wake = deadline.map(Instant::from_std).unwrap_or_else(Instant::now);

        tokio::select! {
            event = events.recv() => match event {
                Some(PageEvent::Resize(width)) => page.resize(width, Instant::now().into_std()),
                Some(PageEvent::Tap { target, event }) => {
                    match page.tap(target, &event) {
                        Ok(outcome) => log::trace!("Tap {} ({}) -> {:?}", target, event, outcome),
                        Err(e) => log::warn!("Dropping tap ({}): {}", event, e),
                    }
                }
                None => break,
            },
            _ = sleep_until(wake), if deadline.is_some() => {
                let notified = page.poll(Instant::now().into_std());
                log::debug!("Resize settled at {}px | notified: {}", page.viewport_width(), notified);
            }
        }
    }

    if let Some(deadline) = page.deadline() {
        sleep_until(Instant::from_std(deadline)).await;
        page.poll(Instant::now().into_std());
    }
    log::debug!("Event channel closed after {} settled resizes", page.settled_ticks());
    page
}
