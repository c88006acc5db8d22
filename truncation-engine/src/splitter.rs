//! 字符预算文本切分器
//! 核心职责：
//! 1. 按顺序累计子元素纯文本长度，划分完整保留 / 切分点 / 完全排除
//! 2. 在切分点子元素内按空白分词，定位第一个超出剩余预算的单词
//! 3. 以字符偏移（而非标记串搜索）描述切分边界，交由 DOM 层映射
//!
//! 长度统一按 Unicode 标量值计数。

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::{EngineError, EngineResult};

/// 切分点：第一个累计文本跨越预算的子元素
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPoint {
    /// 子元素下标
    pub child: usize,
    /// 该子元素之前已保留的字符数
    pub char_total: usize,
    /// 该子元素内可用的剩余预算
    pub remaining: usize,
    /// 截断起始字符偏移（切断单词前空白的起点）；无单词越界时为 None
    pub cut_offset: Option<usize>,
    /// 被切断的单词
    pub cut_word: Option<String>,
}

/// 切分计划
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPlan {
    pub child_count: usize,
    pub split: Option<SplitPoint>,
}

impl SplitPlan {
    /// 完全排除（折叠时隐藏）的子元素下标区间
    pub fn excluded(&self) -> Range<usize> {
        match &self.split {
            Some(point) => (point.child + 1)..self.child_count,
            None => self.child_count..self.child_count,
        }
    }

    /// 需要包裹尾部文本的切分点
    pub fn wrapped(&self) -> Option<&SplitPoint> {
        self.split.as_ref().filter(|p| p.cut_offset.is_some())
    }

    /// 预算覆盖全部文本：无排除、无包裹
    pub fn is_noop(&self) -> bool {
        self.excluded().is_empty() && self.wrapped().is_none()
    }
}

/// 单词越界结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutWord {
    pub offset: usize,
    pub word: String,
}

/// 文本切分器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSplitter {
    budget: usize,
}

impl TextSplitter {
    /// 预算必须为正整数
    pub fn new(budget: usize) -> EngineResult<Self> {
        if budget == 0 {
            return Err(EngineError::InvalidBudget(budget));
        }
        Ok(Self { budget })
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// 对有序子元素文本生成切分计划
    pub fn plan<S: AsRef<str>>(&self, texts: &[S]) -> SplitPlan {
        let mut char_total = 0usize;

        for (index, text) in texts.iter().enumerate() {
            let text = text.as_ref();
            let len = text.chars().count();

            // 完整保留
            if char_total + len <= self.budget {
                char_total += len;
                continue;
            }

            // 切分点
            let remaining = self.budget.saturating_sub(char_total);
            let cut = Self::find_cut(text, remaining);
            log::debug!(
                "Split point at child #{} | kept chars: {} | remaining: {} | cut word: {:?}",
                index,
                char_total,
                remaining,
                cut.as_ref().map(|c| c.word.as_str())
            );

            return SplitPlan {
                child_count: texts.len(),
                split: Some(SplitPoint {
                    child: index,
                    char_total,
                    remaining,
                    cut_offset: cut.as_ref().map(|c| c.offset),
                    cut_word: cut.map(|c| c.word),
                }),
            };
        }

        SplitPlan {
            child_count: texts.len(),
            split: None,
        }
    }

    /// 按空白分词，每个单词计入 长度+1（分隔符），按单词在文本中的实际字符位置累计
    /// 连续空白按实际长度计入，保留文本不会超过 remaining；
    /// 第一个使累计值超过 remaining 的单词即为切断词；
    /// 返回的偏移为前一个单词结束处（首词越界时为 0）
    pub fn find_cut(text: &str, remaining: usize) -> Option<CutWord> {
        let mut prev_end = 0usize;

        for (start, word) in words_with_offsets(text) {
            let word_len = word.chars().count();
            if start + word_len + 1 > remaining {
                return Some(CutWord {
                    offset: prev_end,
                    word: word.to_string(),
                });
            }
            prev_end = start + word_len;
        }
        None
    }
}

/// 空白分词，附带单词起始字符偏移
fn words_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> + '_ {
    let mut chars = text.char_indices().enumerate().peekable();
    std::iter::from_fn(move || {
        // 跳过空白
        while let Some((_, (_, ch))) = chars.peek() {
            if !ch.is_whitespace() {
                break;
            }
            chars.next();
        }
        let (char_start, (byte_start, _)) = chars.next()?;
        let mut byte_end = text.len();
        while let Some((_, (byte_idx, ch))) = chars.peek() {
            if ch.is_whitespace() {
                byte_end = *byte_idx;
                break;
            }
            chars.next();
        }
        Some((char_start, &text[byte_start..byte_end]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_budget_rejected() {
        assert_eq!(TextSplitter::new(0), Err(EngineError::InvalidBudget(0)));
    }

    #[test]
    fn test_single_child_cut() {
        // 测试场景：20 字符预算，"The quick brown fox jumps" 在 "jumps" 处切断
        let splitter = TextSplitter::new(20).unwrap();
        let plan = splitter.plan(&["The quick brown fox jumps"]);

        let point = plan.split.clone().unwrap();
        assert_eq!(point.child, 0);
        assert_eq!(point.cut_offset, Some(19));
        assert_eq!(point.cut_word.as_deref(), Some("jumps"));
        assert!(plan.excluded().is_empty());
        assert!(plan.wrapped().is_some());
    }

    #[test]
    fn test_children_after_split_are_excluded() {
        // 测试场景：第二个子元素越界，之后全部排除
        let splitter = TextSplitter::new(12).unwrap();
        let plan = splitter.plan(&["Hello", "lovely world out there", "tail", "more"]);

        let point = plan.split.clone().unwrap();
        assert_eq!(point.child, 1);
        assert_eq!(point.char_total, 5);
        assert_eq!(point.remaining, 7);
        // "lovely"(7) 恰好等于剩余预算，"world" 越界
        assert_eq!(point.cut_offset, Some(6));
        assert_eq!(plan.excluded(), 2..4);
    }

    #[test]
    fn test_budget_covers_everything() {
        // 测试场景：预算大于总长度，无任何切分
        let splitter = TextSplitter::new(100).unwrap();
        let plan = splitter.plan(&["short", "text"]);
        assert_eq!(plan.split, None);
        assert!(plan.is_noop());
    }

    #[test]
    fn test_first_word_overflows() {
        // 测试场景：首个单词即越界，从偏移 0 开始包裹
        let cut = TextSplitter::find_cut("Supercalifragilistic words", 5).unwrap();
        assert_eq!(cut.offset, 0);
        assert_eq!(cut.word, "Supercalifragilistic");
    }

    #[test]
    fn test_trailing_whitespace_only_overflow() {
        // 测试场景：仅尾部空白超出预算，单词全部保留，无包裹
        let splitter = TextSplitter::new(4).unwrap();
        let plan = splitter.plan(&["abc      ", "next"]);
        let point = plan.split.clone().unwrap();
        assert_eq!(point.cut_offset, None);
        assert!(plan.wrapped().is_none());
        assert_eq!(plan.excluded(), 1..2);
    }

    #[test]
    fn test_multibyte_offsets_are_char_based() {
        // 测试场景：多字节字符按字符计数
        let cut = TextSplitter::find_cut("héllo wörld ünïcode", 12).unwrap();
        assert_eq!(cut.word, "ünïcode");
        assert_eq!(cut.offset, 11);
    }

    #[test]
    fn test_whitespace_runs_count_toward_budget() {
        // 测试场景：缩进 HTML 中的换行与连续空白按实际长度计入预算
        let text = format!("aa{}bb cc dd ee", " ".repeat(20));
        let cut = TextSplitter::find_cut(&text, 10).unwrap();
        assert_eq!(cut.offset, 2);
        assert_eq!(cut.word, "bb");

        let indented = "\n    Lorem ipsum\n    dolor sit\n    amet";
        let cut = TextSplitter::find_cut(indented, 20).unwrap();
        assert_eq!(cut.word, "dolor");
        assert_eq!(cut.offset, 16);
        for budget in 1..indented.chars().count() {
            if let Some(cut) = TextSplitter::find_cut(indented, budget) {
                assert!(cut.offset <= budget, "budget {} kept {}", budget, cut.offset);
            }
        }
    }

    #[test]
    fn test_kept_text_stays_within_budget() {
        // 测试场景：保留文本长度不超过预算
        let text = "one two three four five six seven eight nine ten";
        for budget in 1..text.len() {
            if let Some(cut) = TextSplitter::find_cut(text, budget) {
                assert!(cut.offset <= budget, "budget {} kept {}", budget, cut.offset);
            }
        }
    }
}
