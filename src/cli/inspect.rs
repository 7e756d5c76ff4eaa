//! # inspect 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/inspect.rs`

use clap::Args;
use std::path::PathBuf;

/// inspect 子命令参数
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the ONCVPSP output file
    pub report: PathBuf,

    /// Print metadata and hints as JSON instead of tables
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
