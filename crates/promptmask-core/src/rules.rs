//! 规则文件加载（TOML）
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use crate::error::{MaskError, Result};
use crate::types::Category;

/// 内置规则表，编译期嵌入
pub(crate) const BUILTIN_RULES: &str = include_str!("../rules/default.toml");

/// 单条规则的配置（支持 pattern 或 regex 字段，或 terms 词表）
#[derive(Debug, Clone, Deserialize)]
struct RuleEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub category: String,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default)]
    pub terms: Option<Vec<String>>,
    #[serde(default = "default_case_insensitive")]
    pub case_insensitive: bool,
}

fn default_case_insensitive() -> bool {
    true
}

/// 顶层规则文件结构
#[derive(Debug, Clone, Deserialize)]
struct RuleFile {
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

/// 规则的匹配方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    Pattern(String),
    Vocabulary(Vec<String>),
}

/// 归一化后的规则规格
#[derive(Debug, Clone)]
pub struct RuleSpec {
    pub id: String,
    pub name: Option<String>,
    pub category: Category,
    pub kind: RuleKind,
    pub case_insensitive: bool,
    /// 在规则文件中的位置，数值越小优先级越高
    pub priority: usize,
}

/// 解析 TOML 文本并归一化为 RuleSpec 列表
pub fn parse_rule_specs(txt: &str) -> Result<Vec<RuleSpec>> {
    let parsed: RuleFile = toml::from_str(txt)?;
    let mut out = Vec::new();

    for e in parsed.rules {
        let category: Category = e.category.parse().map_err(|_| MaskError::InvalidRule {
            id: e.id.clone(),
            reason: format!("unknown category '{}'", e.category),
        })?;
        // 兼容两种字段名：pattern 或 regex；二者皆无时再看 terms
        let kind = match (e.pattern, e.regex, e.terms) {
            (Some(p), _, _) => RuleKind::Pattern(p),
            (None, Some(r), _) => RuleKind::Pattern(r),
            (None, None, Some(t)) if !t.is_empty() => RuleKind::Vocabulary(t),
            _ => {
                warn!(rule = %e.id, "rule has neither pattern nor terms, skipped");
                continue;
            }
        };
        let priority = out.len();
        out.push(RuleSpec {
            id: e.id,
            name: e.name,
            category,
            kind,
            case_insensitive: e.case_insensitive,
            priority,
        });
    }

    Ok(out)
}

/// 从 TOML 规则文件加载
pub fn load_rule_specs(path: &Path) -> Result<Vec<RuleSpec>> {
    let txt = std::fs::read_to_string(path)?;
    parse_rule_specs(&txt)
}

pub(crate) fn builtin_rule_specs() -> Result<Vec<RuleSpec>> {
    parse_rule_specs(BUILTIN_RULES)
}
