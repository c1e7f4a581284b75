//! 封闭词表检测（Aho-Corasick + 单词边界）
//!
//! 设计要点：
//! - 词表在构建时编译为一个 AC 自动机，之后只读共享。
//! - 使用重叠搜索收集所有候选，再逐个做与正则 `\b` 等价的边界校验。
//! - 候选之间的重叠交给全局的重叠消解（findings.rs）处理。

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use std::collections::HashSet;

use crate::detectors::Detector;
use crate::error::{MaskError, Result};
use crate::types::{Category, Span};

pub struct VocabularyDetector {
    id: String,
    category: Category,
    ac: AhoCorasick,
}

impl VocabularyDetector {
    pub fn new(id: &str, category: Category, terms: &[String], case_insensitive: bool) -> Result<Self> {
        let invalid = |reason: String| MaskError::InvalidRule { id: id.to_string(), reason };

        // 去重（大小写不敏感时按小写去重），保持原顺序
        let mut seen: HashSet<String> = HashSet::new();
        let mut uniq: Vec<&str> = Vec::with_capacity(terms.len());
        for t in terms {
            let t = t.trim();
            if t.is_empty() {
                return Err(invalid("vocabulary contains an empty term".into()));
            }
            let key = if case_insensitive { t.to_ascii_lowercase() } else { t.to_string() };
            if seen.insert(key) {
                uniq.push(t);
            }
        }

        let ac = AhoCorasickBuilder::new()
            .ascii_case_insensitive(case_insensitive)
            .match_kind(MatchKind::Standard)
            .build(&uniq)
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self { id: id.to_string(), category, ac })
    }
}

impl Detector for VocabularyDetector {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Category {
        self.category
    }

    fn detect(&self, text: &str) -> Result<Vec<Span>> {
        let mut spans = Vec::new();
        for m in self.ac.find_overlapping_iter(text) {
            if is_word_boundary(text, m.start()) && is_word_boundary(text, m.end()) {
                spans.push(Span::new(text, m.start(), m.end(), self.category)?);
            }
        }
        Ok(spans)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// 与正则 `\b` 相同：两侧字符的“单词性”不同即为边界
pub(crate) fn is_word_boundary(text: &str, pos: usize) -> bool {
    if !text.is_char_boundary(pos) {
        return false;
    }
    let before = text[..pos].chars().next_back().map_or(false, is_word_char);
    let after = text[pos..].chars().next().map_or(false, is_word_char);
    before != after
}
