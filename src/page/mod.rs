//! 页面模块：初始化所有截断容器，分发点击与 resize 事件
pub mod page;
#[cfg(feature = "runtime")]
pub mod runtime;

pub use self::page::{PageEnvironment, TruncationPage};
#[cfg(feature = "runtime")]
pub use self::runtime::{drive, PageEvent};
