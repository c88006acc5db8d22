//! easy-truncation - 动态内容截断部件
//! 条目数 / 字符数截断，More / Less 切换控件，按视口宽度自动展开

// 导出全局错误类型
pub use self::error::{TruncateError, TruncateResult};

// 导出配置模块
pub use self::config::{
    ContainerConfig, ParseMode, TapEvent, TruncationMode, WidgetConfig, WidgetConfigBuilder,
};

// 导出 DOM 抽象
pub use self::dom::{Document, Dom, NodeId, Selector};

// 导出控制器
pub use self::controller::{Affordance, CollapseTargets, TapOutcome, TruncationController};

// 导出页面入口
pub use self::page::{PageEnvironment, TruncationPage};
#[cfg(feature = "runtime")]
pub use self::page::{drive, PageEvent};

// 导出内核常用类型
pub use truncation_engine::{
    AffordanceLabel, ResizeWatcher, SettledTick, SplitPlan, SplitPoint, TextSplitter,
    TruncationState, DEFAULT_QUIET_PERIOD,
};

// 声明所有子模块
pub mod config;
pub mod controller;
pub mod dom;
pub mod error;
pub mod page;
pub mod utils;
