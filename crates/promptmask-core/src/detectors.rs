//! 检测器集合（正则 + 词表）
use regex::{Regex, RegexBuilder};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::error::{MaskError, Result};
use crate::rules::{builtin_rule_specs, load_rule_specs, RuleKind, RuleSpec};
use crate::types::{Category, Span};
use crate::vocabulary::VocabularyDetector;

/// 单个检测器：扫描文本，返回该类别的命中片段
///
/// 实现必须是纯函数；返回的片段偏移必须合法（非空、不越界）。
pub trait Detector: Send + Sync {
    fn id(&self) -> &str;
    fn category(&self) -> Category;
    fn detect(&self, text: &str) -> Result<Vec<Span>>;
}

/// 正则检测器
pub struct PatternDetector {
    id: String,
    category: Category,
    re: Regex,
}

impl PatternDetector {
    pub fn new(id: &str, category: Category, pattern: &str, case_insensitive: bool) -> Result<Self> {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| MaskError::InvalidRule { id: id.to_string(), reason: e.to_string() })?;
        // 可匹配空串的规则会产出零长度片段，构建时即拒绝
        if re.find("").is_some() {
            return Err(MaskError::InvalidRule {
                id: id.to_string(),
                reason: "pattern matches the empty string".into(),
            });
        }
        Ok(Self { id: id.to_string(), category, re })
    }
}

impl Detector for PatternDetector {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> Category {
        self.category
    }

    fn detect(&self, text: &str) -> Result<Vec<Span>> {
        let mut spans = Vec::new();
        if self.re.captures_len() > 1 {
            // 优先使用第1个捕获组，便于规则携带前后文而只掩码其中一段
            for caps in self.re.captures_iter(text) {
                let m = match caps.get(1).or_else(|| caps.get(0)) {
                    Some(m) => m,
                    None => continue,
                };
                spans.push(self.checked(text, m.start(), m.end())?);
            }
        } else {
            for m in self.re.find_iter(text) {
                spans.push(self.checked(text, m.start(), m.end())?);
            }
        }
        Ok(spans)
    }
}

impl PatternDetector {
    fn checked(&self, text: &str, start: usize, end: usize) -> Result<Span> {
        Span::new(text, start, end, self.category).map_err(|e| match e {
            MaskError::InternalDetector { reason, .. } => {
                MaskError::InternalDetector { detector: self.id.clone(), reason }
            }
            other => other,
        })
    }
}

/// 有序检测器注册表；顺序即优先级
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn Detector>>,
}

impl DetectorRegistry {
    /// 从规则条目构建检测器集合
    pub fn from_specs(specs: &[RuleSpec]) -> Result<Self> {
        let mut sorted: Vec<&RuleSpec> = specs.iter().collect();
        sorted.sort_by_key(|s| s.priority);

        let mut detectors: Vec<Box<dyn Detector>> = Vec::with_capacity(sorted.len());
        for r in sorted {
            let d: Box<dyn Detector> = match &r.kind {
                RuleKind::Pattern(p) => {
                    Box::new(PatternDetector::new(&r.id, r.category, p, r.case_insensitive)?)
                }
                RuleKind::Vocabulary(terms) => {
                    Box::new(VocabularyDetector::new(&r.id, r.category, terms, r.case_insensitive)?)
                }
            };
            detectors.push(d);
        }
        Ok(Self { detectors })
    }

    /// 从 TOML 规则文件构建（替换内置表）
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_specs(&load_rule_specs(path)?)
    }

    /// 进程级内置注册表：首次使用时编译，之后只读共享
    pub fn builtin() -> Arc<DetectorRegistry> {
        static BUILTIN: OnceLock<Arc<DetectorRegistry>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| {
                let specs = builtin_rule_specs().expect("embedded rule table parses");
                Arc::new(DetectorRegistry::from_specs(&specs).expect("embedded rule table compiles"))
            })
            .clone()
    }

    pub fn detectors(&self) -> &[Box<dyn Detector>] {
        &self.detectors
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// 依优先级顺序运行全部检测器；`include_names` 为 false 时跳过 NAME 类规则
    pub fn detect_all(&self, text: &str, include_names: bool) -> Result<Vec<Span>> {
        let mut spans = Vec::new();
        for d in &self.detectors {
            if d.category() == Category::Name && !include_names {
                continue;
            }
            spans.extend(d.detect(text)?);
        }
        Ok(spans)
    }
}
