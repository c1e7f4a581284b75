//! 可选的人名识别能力（NER）
//!
//! 管线只依赖 `NameDetector` 这一最小接口；模型缺失或加载失败时退化为空结果。
use regex::Regex;
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::types::{Category, Span};

/// 人名识别能力接口
pub trait NameDetector: Send + Sync {
    fn detect_names(&self, text: &str) -> Vec<Span>;
}

/// 空实现：不识别任何人名
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNameDetector;

impl NameDetector for NoopNameDetector {
    fn detect_names(&self, _text: &str) -> Vec<Span> {
        Vec::new()
    }
}

/// 确定性的轻量实现：称谓（Mr/Mrs/Ms/Miss/Dr/Prof）后紧跟的一到两个首字母大写单词
#[derive(Debug, Default, Clone, Copy)]
pub struct HonorificNameDetector;

fn honorific_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:Mr|Mrs|Ms|Miss|Dr|Prof)\.?\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)")
            .expect("honorific pattern compiles")
    })
}

impl NameDetector for HonorificNameDetector {
    fn detect_names(&self, text: &str) -> Vec<Span> {
        honorific_regex()
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| Span::new(text, m.start(), m.end(), Category::Name).ok())
            .collect()
    }
}

type Loader = Box<dyn Fn() -> anyhow::Result<Box<dyn NameDetector>> + Send + Sync>;

/// 首次使用时加载底层模型；加载失败后永久退化为不识别人名
pub struct LazyNameDetector {
    loader: Loader,
    cell: OnceLock<Option<Box<dyn NameDetector>>>,
}

impl LazyNameDetector {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> anyhow::Result<Box<dyn NameDetector>> + Send + Sync + 'static,
    {
        Self { loader: Box::new(loader), cell: OnceLock::new() }
    }

    fn get(&self) -> Option<&dyn NameDetector> {
        self.cell
            .get_or_init(|| match (self.loader)() {
                Ok(d) => {
                    info!("name detection model loaded");
                    Some(d)
                }
                Err(e) => {
                    warn!(error = %e, "name detection unavailable, continuing without it");
                    None
                }
            })
            .as_deref()
    }

    /// 是否可用（会触发一次加载）
    pub fn is_available(&self) -> bool {
        self.get().is_some()
    }
}

impl NameDetector for LazyNameDetector {
    fn detect_names(&self, text: &str) -> Vec<Span> {
        match self.get() {
            Some(d) => d.detect_names(text),
            None => Vec::new(),
        }
    }
}
