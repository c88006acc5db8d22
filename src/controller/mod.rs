//! 控制器模块：单个容器的截断状态机
pub mod affordance;
pub mod content;
pub mod truncation;

pub use self::affordance::Affordance;
pub use self::content::CollapseTargets;
pub use self::truncation::{TapOutcome, TruncationController};
