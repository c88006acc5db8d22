//! 容器配置：初始化时一次性从 data-* 属性解析为强类型记录
//! 属性怪癖（非数字、非正数、非法选择器）在此处理，控制器只面对合法配置
use crate::config::{ParseMode, WidgetConfig};
use crate::dom::{Dom, NodeId, Selector};
use crate::error::{TruncateError, TruncateResult};

/// 截断模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationMode {
    /// 保留前 N 个子元素
    MaxItems(usize),
    /// 字符预算
    CharLimit(usize),
}

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    pub mode: TruncationMode,
    /// 视口宽度 >= 阈值时始终展开并隐藏控件
    pub auto_display: Option<u32>,
    /// 永不截断的子元素
    pub exclude: Option<Selector>,
    /// 展开后允许再次折叠
    pub collapsible: bool,
    /// 不显示切换控件，仅依赖省略号 / 自动展开
    pub no_more: bool,
    /// 控件 / 省略号内嵌到内容流中
    pub embed: bool,
}

impl ContainerConfig {
    pub fn new(mode: TruncationMode) -> Self {
        Self {
            mode,
            auto_display: None,
            exclude: None,
            collapsible: false,
            no_more: false,
            embed: false,
        }
    }

    /// 从容器元素属性解析
    /// 返回 Ok(None) 表示该容器不参与截断（宽松模式下的非法上限或缺少上限属性）
    pub fn from_element<D: Dom + ?Sized>(
        dom: &D,
        node: NodeId,
        widget: &WidgetConfig,
    ) -> TruncateResult<Option<Self>> {
        if !dom.is_element(dom.check(node)?) {
            return Err(TruncateError::NotAnElement(node));
        }
        let parser = AttrParser {
            dom,
            node,
            widget,
            mode: widget.parse_mode,
        };

        let max_items = parser.positive("max-items")?;
        let char_limit = parser.positive("char-limit")?;
        let mode = match (char_limit, max_items) {
            (Some(limit), Some(items)) => {
                log::debug!(
                    "{} declares both char-limit={} and max-items={}, using char-limit",
                    node,
                    limit,
                    items
                );
                TruncationMode::CharLimit(limit)
            }
            (Some(limit), None) => TruncationMode::CharLimit(limit),
            (None, Some(items)) => TruncationMode::MaxItems(items),
            (None, None) => return Ok(None),
        };

        Ok(Some(Self {
            mode,
            auto_display: parser.width("auto-display")?,
            exclude: parser.selector("exclude")?,
            collapsible: parser.flag("collapsible"),
            no_more: parser.flag("no-more"),
            embed: parser.flag("embed"),
        }))
    }

    /// 当前视口是否应自动展开
    pub fn auto_displays_at(&self, width: u32) -> bool {
        self.auto_display.map_or(false, |threshold| width >= threshold)
    }
}

/// 单个容器的属性读取器
struct AttrParser<'a, D: Dom + ?Sized> {
    dom: &'a D,
    node: NodeId,
    widget: &'a WidgetConfig,
    mode: ParseMode,
}

impl<D: Dom + ?Sized> AttrParser<'_, D> {
    fn raw(&self, suffix: &str) -> Option<(String, &str)> {
        let name = self.widget.attr(suffix);
        let value = self.dom.attribute(self.node, &name)?;
        Some((name, value))
    }

    fn flag(&self, suffix: &str) -> bool {
        self.raw(suffix).is_some()
    }

    /// 严格模式返回错误，宽松模式记录警告并视为缺省
    fn degrade<T>(&self, err: TruncateError) -> TruncateResult<Option<T>> {
        match self.mode {
            ParseMode::Strict => Err(err),
            ParseMode::Lenient => {
                log::warn!("Ignoring attribute on {}: {}", self.node, err);
                Ok(None)
            }
        }
    }

    fn positive(&self, suffix: &str) -> TruncateResult<Option<usize>> {
        let Some((name, value)) = self.raw(suffix) else {
            return Ok(None);
        };
        match value.trim().parse::<i64>() {
            Ok(n) if n > 0 => Ok(Some(n as usize)),
            Ok(_) => self.degrade(TruncateError::invalid_attribute(
                name,
                value,
                "must be a positive integer",
            )),
            Err(e) => self.degrade(TruncateError::invalid_attribute(name, value, e.to_string())),
        }
    }

    fn width(&self, suffix: &str) -> TruncateResult<Option<u32>> {
        let Some((name, value)) = self.raw(suffix) else {
            return Ok(None);
        };
        match value.trim().parse::<u32>() {
            Ok(n) => Ok(Some(n)),
            Err(e) => self.degrade(TruncateError::invalid_attribute(name, value, e.to_string())),
        }
    }

    fn selector(&self, suffix: &str) -> TruncateResult<Option<Selector>> {
        let Some((_, value)) = self.raw(suffix) else {
            return Ok(None);
        };
        if value.trim().is_empty() {
            return Ok(None);
        }
        match Selector::parse(value) {
            Ok(selector) => Ok(Some(selector)),
            Err(e) => self.degrade(e),
        }
    }
}
