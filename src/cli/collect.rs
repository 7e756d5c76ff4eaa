//! # collect 子命令 CLI 定义
//!
//! 并行解析目录下的 ONCVPSP 报告，汇总元数据和推荐截断能
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/collect.rs`

use crate::batch::collector::DEFAULT_PATTERN;
use clap::Args;
use std::path::PathBuf;

/// collect 子命令参数
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Directory containing ONCVPSP output files
    pub dir: PathBuf,

    /// Glob pattern for report files (comma separated, e.g., "*.out,*.txt")
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Filename for the CSV summary
    #[arg(short, long, default_value = "hints.csv")]
    pub output: PathBuf,
}
