//! 批量掩码选项与统计信息（模块）
use std::path::PathBuf;

/// 批量掩码选项
#[derive(Debug, Clone, Default)]
pub struct MaskOptions {
    /// 是否启用人名识别（需要接入 NameDetector）
    pub enable_name_detection: bool,
    /// 规则文件路径（TOML）；为空则使用内置规则表
    pub rules_path: Option<PathBuf>,
    /// 最大文件大小（字节）；超过则跳过
    pub max_file_size: Option<u64>,
    /// 线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
}

/// 批量统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MaskStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub entities_masked: usize,
}
