//! 核心公共结构体+枚举
pub mod state;

pub use state::{AffordanceLabel, TruncationState};
