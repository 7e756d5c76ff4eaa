//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `models/`, `plot/`, `batch/`, `utils/`
//! - 子模块: inspect, plot, collect, validate

pub mod collect;
pub mod inspect;
pub mod plot;
pub mod validate;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Inspect(args) => inspect::execute(args),
        Commands::Plot(args) => plot::execute(args),
        Commands::Collect(args) => collect::execute(args),
        Commands::Validate(args) => validate::execute(args),
    }
}
