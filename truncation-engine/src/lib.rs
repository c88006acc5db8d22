// 核心公共状态枚举
pub mod core;
// 内核错误定义
pub mod error;
// 视口宽度防抖监听
pub mod watcher;
// 字符预算文本切分
pub mod splitter;

// 顶层导出常用类型
pub use core::{AffordanceLabel, TruncationState};
pub use error::{EngineError, EngineResult};
pub use splitter::{SplitPlan, SplitPoint, TextSplitter};
pub use watcher::{ResizeWatcher, SettledTick, DEFAULT_QUIET_PERIOD};
