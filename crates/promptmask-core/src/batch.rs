//! 目录批量掩码与并行调度
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::detectors::DetectorRegistry;
use crate::error::MaskError;
use crate::masker::Masker;
use crate::options::{MaskOptions, MaskStats};
use crate::types::{MaskingResult, OutputItem};

/// 单个文件的处理结果
enum FileOutcome {
    Masked { file: String, result: MaskingResult },
    Skipped,
    Failed(MaskError),
}

/// 按选项构建掩码器（规则文件为空则用内置表）
pub fn masker_from_options(opts: &MaskOptions) -> crate::error::Result<Masker> {
    match &opts.rules_path {
        Some(p) => Ok(Masker::with_registry(Arc::new(DetectorRegistry::from_path(p)?))),
        None => Ok(Masker::new()),
    }
}

/// 掩码目录下的每个文件，并将结果以 JSON 数组流式写入 `out`
/// 稳定性保证：
/// - 先收集文件并按文件名排序，确保输出顺序可复现
/// - 非 UTF-8 或超过大小上限的文件跳过并计数
/// - 检测器契约错误立即中止
pub fn mask_dir_and_write(
    input_dir: &Path,
    out: &mut dyn Write,
    masker: &Masker,
    opts: &MaskOptions,
) -> Result<MaskStats> {
    let mut files: Vec<PathBuf> = vec![];
    // 只处理单层目录
    for entry in WalkDir::new(input_dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("walk {}", input_dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let threads = opts.threads.unwrap_or_else(num_cpus::get);
    let mut stats = MaskStats::default();

    if threads > 1 && files.len() > 1 {
        mask_and_write_parallel(&files, out, masker, opts, &mut stats, threads)?;
        return Ok(stats);
    }

    write!(out, "[")?;
    let mut first = true;
    for path in &files {
        let outcome = mask_file(path, masker, opts);
        write_outcome(out, outcome, &mut first, &mut stats)?;
    }
    write!(out, "]")?;
    Ok(stats)
}

fn mask_file(path: &Path, masker: &Masker, opts: &MaskOptions) -> FileOutcome {
    let file = match path.file_name().and_then(|s| s.to_str()) {
        Some(s) => s.to_string(),
        None => return FileOutcome::Skipped,
    };
    if let Some(max) = opts.max_file_size {
        if let Ok(md) = std::fs::metadata(path) {
            if md.len() > max {
                debug!(%file, size = md.len(), "file exceeds size limit, skipped");
                return FileOutcome::Skipped;
            }
        }
    }
    let raw = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            warn!(%file, error = %e, "read failed, skipped");
            return FileOutcome::Skipped;
        }
    };
    match masker.mask_bytes(&raw, opts.enable_name_detection) {
        Ok(result) => FileOutcome::Masked { file, result },
        Err(MaskError::InvalidInput(reason)) => {
            debug!(%file, %reason, "not text, skipped");
            FileOutcome::Skipped
        }
        Err(e) => FileOutcome::Failed(e),
    }
}

fn write_outcome(out: &mut dyn Write, outcome: FileOutcome, first: &mut bool, stats: &mut MaskStats) -> Result<()> {
    match outcome {
        FileOutcome::Masked { file, result } => {
            stats.files_scanned += 1;
            stats.entities_masked += result.detected_entities.len();
            if !*first { write!(out, ",")?; } else { *first = false; }
            let item = OutputItem {
                file: &file,
                masked_text: &result.masked_text,
                mapping: &result.mapping,
                detected_entities: &result.detected_entities,
            };
            serde_json::to_writer(&mut *out, &item)?;
        }
        FileOutcome::Skipped => stats.files_skipped += 1,
        FileOutcome::Failed(e) => return Err(e).context("detector failure during batch masking"),
    }
    Ok(())
}

/// 并行调度：
/// - 建索引后使用 Rayon 线程池并行掩码
/// - 单线程 Writer 按 idx 重排并流式写 JSON，保证稳定顺序
fn mask_and_write_parallel(
    files: &[PathBuf],
    out: &mut dyn Write,
    masker: &Masker,
    opts: &MaskOptions,
    stats: &mut MaskStats,
    threads: usize,
) -> Result<()> {
    use crossbeam_channel as channel;
    use rayon::prelude::*;
    use std::collections::BTreeMap;

    write!(out, "[")?;
    let mut first = true;

    let (tx, rx) = channel::bounded::<(usize, FileOutcome)>(256);

    // Writer 留在当前线程，掩码在后台线程的 Rayon 池中执行
    let masker = masker.clone();
    let opts_bg = opts.clone();
    let files_vec: Vec<(usize, PathBuf)> = files.iter().cloned().enumerate().collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("build rayon pool")?;

    let worker = std::thread::spawn(move || {
        pool.install(|| {
            files_vec.par_iter().for_each(|(idx, path)| {
                let _ = tx.send((*idx, mask_file(path, &masker, &opts_bg)));
            });
        });
        // 结束后 Sender 全部被丢弃，Receiver 将收到关闭信号
    });

    let mut next_idx: usize = 0;
    let mut buffer: BTreeMap<usize, FileOutcome> = BTreeMap::new();
    let mut result: Result<()> = Ok(());

    'recv: while let Ok((idx, outcome)) = rx.recv() {
        buffer.insert(idx, outcome);
        while let Some(outcome) = buffer.remove(&next_idx) {
            if let Err(e) = write_outcome(out, outcome, &mut first, stats) {
                result = Err(e);
                break 'recv;
            }
            next_idx += 1;
        }
    }

    // 出错时先丢弃 Receiver，使仍在发送的 worker 尽快结束
    drop(rx);
    let _ = worker.join();
    result?;

    write!(out, "]")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_use_builtin_rules() {
        let m = masker_from_options(&MaskOptions::default()).unwrap();
        assert!(!m.registry().is_empty());
    }

    #[test]
    fn missing_rule_file_is_an_error() {
        let opts = MaskOptions { rules_path: Some("/nonexistent/rules.toml".into()), ..Default::default() };
        assert!(matches!(masker_from_options(&opts), Err(MaskError::Io(_))));
    }
}
