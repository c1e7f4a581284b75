//! 错误类型
use thiserror::Error;

/// 掩码/还原过程中的错误
#[derive(Debug, Error)]
pub enum MaskError {
    /// 输入不是合法文本（非 UTF-8、映射值非字符串等），由调用方转为客户端错误
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 检测器违反契约（零长度或越界片段）：属于程序缺陷，不做恢复
    #[error("detector '{detector}' produced an invalid span: {reason}")]
    InternalDetector { detector: String, reason: String },

    /// 规则无法编译，或可匹配空串
    #[error("invalid rule '{id}': {reason}")]
    InvalidRule { id: String, reason: String },

    #[error("failed to read rule file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse rule file: {0}")]
    RuleFile(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, MaskError>;
