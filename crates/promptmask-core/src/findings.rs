//! 命中片段排序与重叠消解（内部使用）
use crate::types::Span;

/// 稳定排序：起始偏移升序 → 长度降序；两者皆同则保持检测器优先级顺序
pub(crate) fn sort_spans_stable(spans: &mut [Span]) {
    spans.sort_by(|a, b| {
        use std::cmp::Ordering;
        match a.start.cmp(&b.start) {
            Ordering::Equal => b.len().cmp(&a.len()),
            o => o,
        }
    });
}

/// 贪心选取互不重叠的片段：先被接受者胜出，与其共享任一位置的后续片段被丢弃
///
/// 返回结果按起始偏移升序。
pub(crate) fn resolve_overlaps(mut spans: Vec<Span>) -> Vec<Span> {
    sort_spans_stable(&mut spans);
    let mut accepted: Vec<Span> = Vec::with_capacity(spans.len());
    for s in spans {
        // 已接受片段按起点升序且互不重叠，只需与最后一个比较
        let clashes = accepted.last().map_or(false, |last| last.overlaps(&s));
        if !clashes {
            accepted.push(s);
        }
    }
    accepted
}
