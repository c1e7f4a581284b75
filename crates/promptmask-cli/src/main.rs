use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use promptmask_core::{
    mask_dir_and_write, masker_from_options, HonorificNameDetector, Mapping, MaskOptions, Masker,
};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "promptmask", version, about = "Mask sensitive details in prompts and restore them in replies")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 掩码单段文本，输出 JSON（masked_text / mapping / detected_entities）
    Mask {
        /// 直接给出文本；与 --input 二选一，都缺省时读取 stdin
        #[arg(long, conflicts_with = "input")]
        text: Option<String>,

        /// 输入文件
        #[arg(long)]
        input: Option<PathBuf>,

        /// 启用人名识别
        #[arg(long)]
        names: bool,

        /// 规则文件路径（TOML），缺省使用内置规则
        #[arg(long)]
        rules: Option<PathBuf>,
    },

    /// 用映射表还原文本中的占位符
    Unmask {
        /// 映射文件（JSON 对象：占位符 → 原文）
        #[arg(long)]
        mapping: PathBuf,

        #[arg(long, conflicts_with = "input")]
        text: Option<String>,

        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// 掩码目录下的全部文件并生成 result.json
    Batch {
        /// 输入目录
        #[arg(long)]
        input: PathBuf,

        /// 输出文件（JSON 数组）
        #[arg(long, default_value = "./result.json")]
        output: PathBuf,

        /// 线程数（"auto"=CPU 核心数）
        #[arg(long, default_value = "auto")]
        threads: String,

        /// 最大文件大小（单位字节，例如 5242880 代表 5MB）
        #[arg(long)]
        max_file_size: Option<u64>,

        #[arg(long)]
        names: bool,

        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Mask { text, input, names, rules } => {
            let opts = MaskOptions { enable_name_detection: names, rules_path: rules, ..Default::default() };
            let masker = build_masker(&opts)?;
            let text = read_text(text, input)?;
            let result = masker.mask(&text, names).context("mask failed")?;
            info!(entities = result.detected_entities.len(), "mask finished");
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Unmask { mapping, text, input } => {
            let raw = std::fs::read_to_string(&mapping)
                .with_context(|| format!("read mapping {}", mapping.display()))?;
            let value: serde_json::Value = serde_json::from_str(&raw).context("parse mapping")?;
            let mapping = Mapping::from_json(&value)?;
            let text = read_text(text, input)?;
            println!("{}", Masker::new().unmask(&text, &mapping));
        }
        Commands::Batch { input, output, threads, max_file_size, names, rules } => {
            info!(?input, ?output, "starting batch");
            let opts = MaskOptions {
                enable_name_detection: names,
                rules_path: rules,
                max_file_size,
                threads: parse_threads(&threads),
            };
            let masker = build_masker(&opts)?;

            // 以缓冲方式打开输出文件，按 JSON 数组流式写入
            let mut out = BufWriter::new(File::create(&output).context("create output file")?);
            let stats = mask_dir_and_write(&input, &mut out, &masker, &opts).context("batch masking failed")?;
            out.flush().context("flush output")?;

            info!(
                files_scanned = stats.files_scanned,
                files_skipped = stats.files_skipped,
                entities_masked = stats.entities_masked,
                "batch finished"
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // 日志写 stderr，stdout 只留给结果
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 规则文件 + 可选的称谓人名识别
fn build_masker(opts: &MaskOptions) -> Result<Masker> {
    let masker = masker_from_options(opts).context("load rules")?;
    if opts.enable_name_detection {
        return Ok(masker.with_name_detector(Arc::new(HonorificNameDetector)));
    }
    Ok(masker)
}

fn read_text(text: Option<String>, input: Option<PathBuf>) -> Result<String> {
    if let Some(t) = text {
        return Ok(t);
    }
    let raw = match input {
        Some(p) => std::fs::read(&p).with_context(|| format!("read {}", p.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf).context("read stdin")?;
            buf
        }
    };
    match String::from_utf8(raw) {
        Ok(s) => Ok(s),
        Err(_) => bail!("input is not valid UTF-8 text"),
    }
}

/// 解析线程参数
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") { return None; }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threads_argument() {
        assert_eq!(parse_threads("auto"), None);
        assert_eq!(parse_threads("AUTO"), None);
        assert_eq!(parse_threads("3"), Some(3));
        assert_eq!(parse_threads("0"), None);
        assert_eq!(parse_threads("x"), None);
    }

    #[test]
    fn cli_parses_mask_command() {
        let cli = Cli::try_parse_from(["promptmask", "mask", "--text", "hi", "--names"]).unwrap();
        match cli.command {
            Commands::Mask { text, names, .. } => {
                assert_eq!(text.as_deref(), Some("hi"));
                assert!(names);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn text_and_input_conflict() {
        assert!(Cli::try_parse_from(["promptmask", "mask", "--text", "a", "--input", "f"]).is_err());
    }
}
