//! 还原引擎：掩码文本 + 映射 → 原文
use aho_corasick::{AhoCorasickBuilder, MatchKind};
use tracing::warn;

use crate::types::Mapping;

/// 将文本中出现的每个映射键替换为其原值
///
/// 单遍扫描：已还原的内容不会被再次替换。映射中未出现的键、文本中未登记的
/// 括号记号都原样保留。
pub(crate) fn restore(masked: &str, mapping: &Mapping) -> String {
    let (keys, values): (Vec<&str>, Vec<&str>) =
        mapping.iter().filter(|(k, _)| !k.is_empty()).unzip();
    if keys.is_empty() {
        return masked.to_string();
    }

    match AhoCorasickBuilder::new().match_kind(MatchKind::LeftmostLongest).build(&keys) {
        Ok(ac) => ac.replace_all(masked, &values),
        Err(e) => {
            // 自动机构建失败时退化为逐键替换
            warn!(error = %e, "placeholder automaton build failed, falling back to per-key replace");
            keys.iter()
                .zip(&values)
                .fold(masked.to_string(), |acc, (k, v)| acc.replace(k, v))
        }
    }
}
