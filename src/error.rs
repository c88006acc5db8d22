//! 全局错误类型定义
use thiserror::Error;
use truncation_engine::EngineError;

use crate::dom::NodeId;

#[derive(Error, Debug)]
pub enum TruncateError {
    // 配置相关错误
    #[error("Invalid attribute {attribute}=\"{value}\": {reason}")]
    InvalidAttribute {
        attribute: String,
        value: String,
        reason: String,
    },
    #[error("Invalid selector \"{0}\": {1}")]
    InvalidSelector(String, String),
    #[error("Widget config parse failed: {0}")]
    ConfigError(#[from] serde_json::Error),

    // DOM 相关错误
    #[error("HTML parse failed: {0}")]
    HtmlParseError(String),
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    // 内核错误
    #[error("Engine error: {0}")]
    EngineError(#[from] EngineError),
}

impl TruncateError {
    pub(crate) fn invalid_attribute(
        attribute: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        TruncateError::InvalidAttribute {
            attribute: attribute.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

// 全局Result类型
pub type TruncateResult<T> = Result<T, TruncateError>;
