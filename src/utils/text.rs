//! 文本工具：HTML 实体解码与转义
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").unwrap());

/// 常用命名实体
fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "hellip" => '\u{2026}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "copy" => '\u{a9}',
        _ => return None,
    })
}

/// 解码实体；无法识别的实体原样保留
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }
    ENTITY_RE.replace_all(input, |caps: &Captures| {
        let body = &caps[1];
        let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        } else if let Some(dec) = body.strip_prefix('#') {
            dec.parse::<u32>().ok().and_then(char::from_u32)
        } else {
            named_entity(body)
        };
        match decoded {
            Some(ch) => ch.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// 文本节点转义
pub fn escape_text(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>']) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// 属性值转义（双引号包裹）
pub fn escape_attr(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '"']) {
        return Cow::Borrowed(input);
    }
    Cow::Owned(input.replace('&', "&amp;").replace('"', "&quot;"))
}
