//! 替换引擎：原文 + 已接受片段 → 掩码文本 + 映射
use std::collections::HashMap;

use crate::types::{Category, DetectedEntity, Mapping, MaskingResult, Placeholder, Span};

/// 按类别计数的占位符生成器；每次调用新建，不跨调用共享
#[derive(Debug, Default)]
struct PlaceholderCounter {
    next: HashMap<Category, usize>,
}

impl PlaceholderCounter {
    fn next(&mut self, category: Category) -> Placeholder {
        let n = self.next.entry(category).or_insert(0);
        let p = Placeholder::new(category, *n);
        *n += 1;
        p
    }
}

/// 执行替换
///
/// `accepted` 必须互不重叠且按起点升序（见 `findings::resolve_overlaps`）。
/// 编号按原文偏移升序分配；拼接按起点降序进行，偏移始终相对原文。
pub(crate) fn substitute(text: &str, accepted: &[Span]) -> MaskingResult {
    let mut counter = PlaceholderCounter::default();
    let placeholders: Vec<String> =
        accepted.iter().map(|s| counter.next(s.category).to_string()).collect();

    let mut masked = text.to_string();
    let mut mapping = Mapping::new();
    for (s, ph) in accepted.iter().zip(&placeholders).rev() {
        masked.replace_range(s.start..s.end, ph);
        mapping.insert(ph.clone(), s.value.clone());
    }

    let detected_entities = accepted
        .iter()
        .zip(placeholders)
        .map(|(s, placeholder)| DetectedEntity {
            category: s.category,
            value: s.value.clone(),
            placeholder,
            start: s.start,
            end: s.end,
        })
        .collect();

    MaskingResult { original_text: text.to_string(), masked_text: masked, mapping, detected_entities }
}
