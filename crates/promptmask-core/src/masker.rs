//! 掩码/还原主流程
use std::sync::Arc;
use tracing::debug;

use crate::detectors::DetectorRegistry;
use crate::engine_mask::substitute;
use crate::engine_unmask::restore;
use crate::error::{MaskError, Result};
use crate::findings::resolve_overlaps;
use crate::ner::NameDetector;
use crate::types::{Category, Mapping, MaskingResult, Span};

/// 掩码器：持有只读的检测器注册表与可选的人名识别能力
///
/// 不含任何可变状态，可在多线程间共享并发调用；计数器与映射在每次调用内新建。
#[derive(Clone)]
pub struct Masker {
    registry: Arc<DetectorRegistry>,
    names: Option<Arc<dyn NameDetector>>,
}

impl Default for Masker {
    fn default() -> Self {
        Self::new()
    }
}

impl Masker {
    /// 使用内置规则表，不接入人名识别
    pub fn new() -> Self {
        Self { registry: DetectorRegistry::builtin(), names: None }
    }

    pub fn with_registry(registry: Arc<DetectorRegistry>) -> Self {
        Self { registry, names: None }
    }

    pub fn with_name_detector(mut self, detector: Arc<dyn NameDetector>) -> Self {
        self.names = Some(detector);
        self
    }

    pub fn registry(&self) -> &DetectorRegistry {
        &self.registry
    }

    pub fn name_detection_available(&self) -> bool {
        self.names.is_some()
    }

    /// 检测并替换敏感片段
    pub fn mask(&self, text: &str, enable_name_detection: bool) -> Result<MaskingResult> {
        let mut spans = self.registry.detect_all(text, enable_name_detection)?;

        if enable_name_detection {
            match &self.names {
                Some(ner) => {
                    for s in ner.detect_names(text) {
                        spans.push(validate_name_span(text, s)?);
                    }
                }
                None => debug!("name detection requested but no detector is wired in"),
            }
        }

        let detected = spans.len();
        let accepted = resolve_overlaps(spans);
        debug!(detected, accepted = accepted.len(), "mask pass complete");
        Ok(substitute(text, &accepted))
    }

    /// 同 `mask`，输入为原始字节；非 UTF-8 视为非法输入
    pub fn mask_bytes(&self, raw: &[u8], enable_name_detection: bool) -> Result<MaskingResult> {
        let text = std::str::from_utf8(raw)
            .map_err(|e| MaskError::InvalidInput(format!("text is not valid UTF-8: {e}")))?;
        self.mask(text, enable_name_detection)
    }

    pub fn unmask(&self, masked: &str, mapping: &Mapping) -> String {
        restore(masked, mapping)
    }
}

/// NER 实现来自外部，其片段需重新校验
fn validate_name_span(text: &str, s: Span) -> Result<Span> {
    let invalid = |reason: String| MaskError::InternalDetector { detector: "ner".into(), reason };
    if s.category != Category::Name {
        return Err(invalid(format!("name detector returned category {}", s.category)));
    }
    let checked = Span::new(text, s.start, s.end, Category::Name).map_err(|e| invalid(e.to_string()))?;
    if checked.value != s.value {
        return Err(invalid(format!("span {}..{} does not match its value", s.start, s.end)));
    }
    Ok(checked)
}

/// 便捷函数：内置规则表掩码（不接入人名识别能力）
pub fn mask_prompt(text: &str, enable_name_detection: bool) -> Result<MaskingResult> {
    Masker::new().mask(text, enable_name_detection)
}

/// 便捷函数：还原模型回复中的占位符
pub fn unmask_response(masked: &str, mapping: &Mapping) -> String {
    restore(masked, mapping)
}
