//! 公共类型（对外暴露）
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{MaskError, Result};

/// 敏感信息类别；占位符中使用大写名称
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    MentalHealth,
    Disease,
    Email,
    Phone,
    Age,
    Gender,
    Location,
    Name,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::MentalHealth,
        Category::Disease,
        Category::Email,
        Category::Phone,
        Category::Age,
        Category::Gender,
        Category::Location,
        Category::Name,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::MentalHealth => "MENTAL_HEALTH",
            Category::Disease => "DISEASE",
            Category::Email => "EMAIL",
            Category::Phone => "PHONE",
            Category::Age => "AGE",
            Category::Gender => "GENDER",
            Category::Location => "LOCATION",
            Category::Name => "NAME",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = MaskError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MaskError::InvalidInput(format!("unknown category '{s}'")))
    }
}

/// 检测命中的片段
///
/// `start`/`end` 为原文中的字节偏移（左闭右开），保证落在字符边界上。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub category: Category,
    pub value: String,
}

impl Span {
    /// 校验偏移并截取原文；零长度或越界视为检测器缺陷
    pub fn new(text: &str, start: usize, end: usize, category: Category) -> Result<Self> {
        let invalid = |reason: String| MaskError::InternalDetector {
            detector: category.as_str().to_string(),
            reason,
        };
        if start >= end {
            return Err(invalid(format!("empty or inverted span {start}..{end}")));
        }
        if end > text.len() {
            return Err(invalid(format!("span {start}..{end} exceeds text length {}", text.len())));
        }
        if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            return Err(invalid(format!("span {start}..{end} splits a character")));
        }
        Ok(Self { start, end, category, value: text[start..end].to_string() })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// 是否与另一片段共享任一位置
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// 占位符 `[CATEGORY_n]`，n 在单次掩码调用内按类别从 0 计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placeholder {
    pub category: Category,
    pub index: usize,
}

impl Placeholder {
    pub fn new(category: Category, index: usize) -> Self {
        Self { category, index }
    }

    /// 解析形如 `[MENTAL_HEALTH_3]` 的记号；不符合语法则返回 None
    pub fn parse(token: &str) -> Option<Self> {
        let inner = token.strip_prefix('[')?.strip_suffix(']')?;
        let (name, idx) = inner.rsplit_once('_')?;
        if idx.is_empty() || !idx.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // 类别名必须严格大写
        let category = Category::ALL.iter().copied().find(|c| c.as_str() == name)?;
        let index = idx.parse().ok()?;
        Some(Self { category, index })
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}_{}]", self.category.as_str(), self.index)
    }
}

/// 占位符 → 原文 的映射表；序列化为扁平 JSON 对象
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping(BTreeMap<String, String>);

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, placeholder: impl Into<String>, original: impl Into<String>) {
        self.0.insert(placeholder.into(), original.into());
    }

    pub fn get(&self, placeholder: &str) -> Option<&str> {
        self.0.get(placeholder).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 从调用方提供的 JSON 构建映射；非对象或值非字符串均为 InvalidInput
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| MaskError::InvalidInput("mapping must be a JSON object".into()))?;
        let mut out = Mapping::new();
        for (k, v) in obj {
            let s = v.as_str().ok_or_else(|| {
                MaskError::InvalidInput(format!("mapping value for '{k}' is not a string"))
            })?;
            out.insert(k.clone(), s);
        }
        Ok(out)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// 对调用方透明展示的检测结果（按原文偏移升序）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedEntity {
    pub category: Category,
    pub value: String,
    pub placeholder: String,
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for DetectedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.value)
    }
}

/// 单次掩码调用的输出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskingResult {
    pub original_text: String,
    pub masked_text: String,
    pub mapping: Mapping,
    pub detected_entities: Vec<DetectedEntity>,
}

/// 批量输出项结构（对应 result.json 的单个元素）
#[derive(Debug, Clone, Serialize)]
pub struct OutputItem<'a> {
    pub file: &'a str,
    pub masked_text: &'a str,
    pub mapping: &'a Mapping,
    pub detected_entities: &'a [DetectedEntity],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_format_is_bit_exact() {
        assert_eq!(Placeholder::new(Category::MentalHealth, 0).to_string(), "[MENTAL_HEALTH_0]");
        assert_eq!(Placeholder::new(Category::Email, 1).to_string(), "[EMAIL_1]");
    }

    #[test]
    fn placeholder_parse() {
        let p = Placeholder::parse("[MENTAL_HEALTH_12]").unwrap();
        assert_eq!(p.category, Category::MentalHealth);
        assert_eq!(p.index, 12);
        assert!(Placeholder::parse("[mental_health_1]").is_none());
        assert!(Placeholder::parse("[EMAIL_]").is_none());
        assert!(Placeholder::parse("[FOO_1]").is_none());
        assert!(Placeholder::parse("EMAIL_1").is_none());
    }

    #[test]
    fn span_rejects_empty_and_out_of_bounds() {
        let text = "héllo";
        assert!(Span::new(text, 2, 2, Category::Name).is_err());
        assert!(Span::new(text, 0, 99, Category::Name).is_err());
        // 'é' 占两个字节，从其中间切开应失败
        assert!(Span::new(text, 2, 4, Category::Name).is_err());
        let s = Span::new(text, 0, 3, Category::Name).unwrap();
        assert_eq!(s.value, "hé");
    }

    #[test]
    fn category_from_str_is_case_insensitive() {
        assert_eq!("mental_health".parse::<Category>().unwrap(), Category::MentalHealth);
        assert!("weather".parse::<Category>().is_err());
    }

    #[test]
    fn mapping_from_json() {
        let ok = serde_json::json!({ "[EMAIL_0]": "a@b.io" });
        assert_eq!(Mapping::from_json(&ok).unwrap().get("[EMAIL_0]"), Some("a@b.io"));

        let bad = serde_json::json!({ "[EMAIL_0]": 3 });
        assert!(matches!(Mapping::from_json(&bad), Err(MaskError::InvalidInput(_))));
        assert!(Mapping::from_json(&serde_json::json!("x")).is_err());
    }

    #[test]
    fn entity_display() {
        let e = DetectedEntity {
            category: Category::Disease,
            value: "diabetes".into(),
            placeholder: "[DISEASE_0]".into(),
            start: 0,
            end: 8,
        };
        assert_eq!(e.to_string(), "DISEASE: diabetes");
    }
}
