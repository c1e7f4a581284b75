//! 提示词掩码核心库
//!
//! 设计要点：
//! - 检测 → 重叠消解 → 占位符替换，全程以原文偏移为准；还原为单遍替换。
//! - 规则表（正则 + 封闭词表）进程内只编译一次，之后只读共享。
//! - 计数器与映射在每次调用内新建，无跨调用可变状态，可并发使用。
//! - 人名识别为可选能力，缺失时静默退化为不识别。

mod batch;
mod detectors;
mod engine_mask;
mod engine_unmask;
mod error;
mod findings;
mod masker;
mod ner;
mod options;
mod rules;
mod types;
mod vocabulary;

pub use batch::{mask_dir_and_write, masker_from_options};
pub use detectors::{Detector, DetectorRegistry, PatternDetector};
pub use error::{MaskError, Result};
pub use masker::{mask_prompt, unmask_response, Masker};
pub use ner::{HonorificNameDetector, LazyNameDetector, NameDetector, NoopNameDetector};
pub use options::{MaskOptions, MaskStats};
pub use rules::{load_rule_specs, parse_rule_specs, RuleKind, RuleSpec};
pub use types::{Category, DetectedEntity, Mapping, MaskingResult, OutputItem, Placeholder, Span};
pub use vocabulary::VocabularyDetector;
