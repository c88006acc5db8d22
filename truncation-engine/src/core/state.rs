use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// 截断控制器状态枚举
/// 每个容器只会处于其中之一：内容折叠 / 内容完整展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TruncationState {
    #[default]
    Hidden,
    Shown,
}

impl TruncationState {
    /// 切换后的目标状态
    pub fn flipped(self) -> Self {
        match self {
            TruncationState::Hidden => TruncationState::Shown,
            TruncationState::Shown => TruncationState::Hidden,
        }
    }
}

impl Display for TruncationState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TruncationState::Hidden => write!(f, "hidden"),
            TruncationState::Shown => write!(f, "shown"),
        }
    }
}

/// 切换控件（More/Less/All）的文案状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AffordanceLabel {
    /// 可展开："More"
    More,
    /// 可再次折叠："Less"
    Less,
    /// 已展开且不可折叠（预置控件保留为惰性）："All"
    All,
}

impl AffordanceLabel {
    pub const ALL: [AffordanceLabel; 3] =
        [AffordanceLabel::More, AffordanceLabel::Less, AffordanceLabel::All];

    /// 文案中被替换的关键词
    pub fn word(self) -> &'static str {
        match self {
            AffordanceLabel::More => "More",
            AffordanceLabel::Less => "Less",
            AffordanceLabel::All => "All",
        }
    }

    /// 将文案中第一个其它状态关键词替换为当前状态关键词
    /// 例："Read More" -> "Read Less"；不含任何关键词时返回 None
    pub fn relabel(self, text: &str) -> Option<String> {
        let target = self.word();
        let (pos, from) = Self::ALL
            .iter()
            .filter(|label| **label != self)
            .filter_map(|label| text.find(label.word()).map(|pos| (pos, label.word())))
            .min_by_key(|(pos, _)| *pos)?;

        let mut out = String::with_capacity(text.len() + target.len());
        out.push_str(&text[..pos]);
        out.push_str(target);
        out.push_str(&text[pos + from.len()..]);
        Some(out)
    }

    /// 从文案中识别当前状态（取最先出现的关键词）
    pub fn detect(text: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .filter_map(|label| text.find(label.word()).map(|pos| (pos, *label)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, label)| label)
    }
}

impl Display for AffordanceLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.word())
    }
}
