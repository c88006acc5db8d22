//! truncation-engine 内核错误定义
//! 封装内核层所有核心错误，与 DOM 层错误解耦，基于thiserror实现类型安全处理
use thiserror::Error;

/// 内核核心错误枚举
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // ===================== 输入相关错误 =====================
    /// 字符预算非法（必须为正整数）
    #[error("Invalid character budget: {0}")]
    InvalidBudget(usize),
}

/// 内核层全局Result类型别名
pub type EngineResult<T> = Result<T, EngineError>;
