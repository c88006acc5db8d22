//! 简单 CSS 选择器
//! 支持：`*`、标签名、`#id`、`.class`、`[attr]`、`[attr=value]`（值可带引号），逗号分隔多组
//! 不支持组合器（空格、`>`、`+`、`~`）与伪类，遇到直接报错
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::dom::{Dom, NodeId};
use crate::error::{TruncateError, TruncateResult};

/// 单个简单选择器片段（锚定在剩余输入开头）
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:(\*)|([A-Za-z][A-Za-z0-9-]*)|\.([A-Za-z0-9_-]+)|#([A-Za-z0-9_-]+)|\[\s*([A-Za-z_:][A-Za-z0-9_:.-]*)\s*(?:=\s*(?:"([^"]*)"|'([^']*)'|([^\]\s"']+))\s*)?\])"#,
    )
    .unwrap()
});

/// 属性匹配条件
#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatcher {
    name: String,
    value: Option<String>,
}

/// 复合选择器：同一元素上的全部条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatcher>,
}

impl Compound {
    fn parse(source: &str, part: &str) -> TruncateResult<Self> {
        let mut compound = Compound::default();
        let mut pos = 0;

        while pos < part.len() {
            let rest = &part[pos..];
            let Some(caps) = TOKEN_RE.captures(rest) else {
                let reason = if rest.starts_with(char::is_whitespace) || rest.starts_with(['>', '+', '~']) {
                    "combinators are not supported".to_string()
                } else {
                    format!("unexpected input at \"{}\"", rest)
                };
                return Err(TruncateError::InvalidSelector(source.to_string(), reason));
            };
            let matched_len = caps.get(0).map_or(0, |m| m.end());

            if caps.get(1).is_some() || caps.get(2).is_some() {
                if pos != 0 {
                    return Err(TruncateError::InvalidSelector(
                        source.to_string(),
                        "type selector must come first".to_string(),
                    ));
                }
                compound.tag = caps.get(2).map(|m| m.as_str().to_ascii_lowercase());
            } else if let Some(class) = caps.get(3) {
                compound.classes.push(class.as_str().to_string());
            } else if let Some(id) = caps.get(4) {
                compound.ids.push(id.as_str().to_string());
            } else if let Some(name) = caps.get(5) {
                let value = caps
                    .get(6)
                    .or_else(|| caps.get(7))
                    .or_else(|| caps.get(8))
                    .map(|m| m.as_str().to_string());
                compound.attrs.push(AttrMatcher {
                    name: name.as_str().to_ascii_lowercase(),
                    value,
                });
            }
            pos += matched_len;
        }
        Ok(compound)
    }

    fn matches<D: Dom + ?Sized>(&self, dom: &D, node: NodeId) -> bool {
        let Some(tag) = dom.tag_name(node) else {
            return false;
        };
        if let Some(expected) = &self.tag {
            if !tag.eq_ignore_ascii_case(expected) {
                return false;
            }
        }
        if !self.ids.iter().all(|id| dom.attribute(node, "id") == Some(id.as_str())) {
            return false;
        }
        if !self.classes.iter().all(|class| dom.has_class(node, class)) {
            return false;
        }
        self.attrs.iter().all(|attr| match (&attr.value, dom.attribute(node, &attr.name)) {
            (None, found) => found.is_some(),
            (Some(expected), Some(found)) => expected == found,
            (Some(_), None) => false,
        })
    }
}

/// 已解析的选择器（逗号分隔的多组复合选择器，任一匹配即匹配）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Compound>,
}

impl Selector {
    pub fn parse(source: &str) -> TruncateResult<Self> {
        let alternatives = split_top_level(source)
            .into_iter()
            .map(|part| {
                let part = part.trim();
                if part.is_empty() {
                    return Err(TruncateError::InvalidSelector(
                        source.to_string(),
                        "empty selector".to_string(),
                    ));
                }
                Compound::parse(source, part)
            })
            .collect::<TruncateResult<Vec<_>>>()?;

        Ok(Self {
            source: source.trim().to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches<D: Dom + ?Sized>(&self, dom: &D, node: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(dom, node))
    }
}

impl FromStr for Selector {
    type Err = TruncateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// 按顶层逗号拆分（忽略方括号和引号内的逗号）
fn split_top_level(source: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (idx, ch) in source.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&source[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&source[start..]);
    parts
}
