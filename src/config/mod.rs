//! 配置模块：全局部件配置 + 容器属性配置
pub mod container;
pub mod widget;

pub use self::container::{ContainerConfig, TruncationMode};
pub use self::widget::{ParseMode, TapEvent, WidgetConfig, WidgetConfigBuilder};
