//! 全局部件配置
//! 类名、属性前缀、文案、防抖静默期等一次性创建后不可变，由所有控制器共享
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::TruncateResult;

/// 属性解析模式
/// - Strict：配置错误直接报错（调试构建默认）
/// - Lenient：配置错误静默降级并记录警告（发布构建默认）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    Strict,
    Lenient,
}

impl Default for ParseMode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        }
    }
}

/// 点击事件名：触摸设备用 touchend，其余用 click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TapEvent {
    Click,
    TouchEnd,
}

impl TapEvent {
    pub fn detect(touch_capable: bool) -> Self {
        if touch_capable {
            TapEvent::TouchEnd
        } else {
            TapEvent::Click
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TapEvent::Click => "click",
            TapEvent::TouchEnd => "touchend",
        }
    }
}

/// 部件配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// 属性与类名前缀（data-{prefix}-max-items / {prefix}-collapsed ...）
    pub prefix: String,
    /// 切换控件容器类名
    pub more_link_class: String,
    /// 新建控件的链接文案
    pub link_text: String,
    /// 新建控件的链接地址
    pub link_href: String,
    /// 省略号文本
    pub ellipsis_text: String,
    /// resize 防抖静默期（毫秒）
    pub quiet_period_ms: u64,
    pub parse_mode: ParseMode,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            prefix: "truncate".to_string(),
            more_link_class: "more-link".to_string(),
            link_text: "Read More".to_string(),
            link_href: "#show-more".to_string(),
            ellipsis_text: "\u{2026}".to_string(),
            quiet_period_ms: 50,
            parse_mode: ParseMode::default(),
        }
    }
}

impl WidgetConfig {
    /// 从 JSON 读取，缺省字段取默认值
    pub fn from_json(json: &str) -> TruncateResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn builder() -> WidgetConfigBuilder {
        WidgetConfigBuilder::new()
    }

    /// 容器属性名：data-{prefix}-{suffix}
    pub fn attr(&self, suffix: &str) -> String {
        format!("data-{}-{}", self.prefix, suffix)
    }

    /// 前缀类名：{prefix}-{suffix}
    pub fn class(&self, suffix: &str) -> String {
        format!("{}-{}", self.prefix, suffix)
    }

    /// "可展开"状态的链接类名
    pub fn reveal_class(&self) -> String {
        self.class("reveal")
    }

    /// 折叠标记类名
    pub fn collapsed_class(&self) -> String {
        self.class("collapsed")
    }

    /// 省略号包裹类名
    pub fn ellipsis_class(&self) -> String {
        self.class("ellipsis")
    }

    /// 截断文本包裹类名
    pub fn truncated_class(&self) -> String {
        self.class("truncated")
    }

    /// 初始化时匹配容器的选择器
    pub fn container_selector(&self) -> String {
        format!("[{}], [{}]", self.attr("max-items"), self.attr("char-limit"))
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

/// 自定义构建器（链式 API）
#[derive(Debug, Clone, Default)]
pub struct WidgetConfigBuilder {
    config: WidgetConfig,
}

impl WidgetConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    pub fn more_link_class(mut self, class: impl Into<String>) -> Self {
        self.config.more_link_class = class.into();
        self
    }

    pub fn link_text(mut self, text: impl Into<String>) -> Self {
        self.config.link_text = text.into();
        self
    }

    pub fn link_href(mut self, href: impl Into<String>) -> Self {
        self.config.link_href = href.into();
        self
    }

    pub fn ellipsis_text(mut self, text: impl Into<String>) -> Self {
        self.config.ellipsis_text = text.into();
        self
    }

    pub fn quiet_period(mut self, period: Duration) -> Self {
        self.config.quiet_period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn parse_mode(mut self, mode: ParseMode) -> Self {
        self.config.parse_mode = mode;
        self
    }

    pub fn build(self) -> WidgetConfig {
        self.config
    }
}
