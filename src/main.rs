//! # psdojo - ONCVPSP 赝势生成报告工具
//!
//! 解析 ONCVPSP 的生成报告（输出文件），提取径向函数、收敛曲线和对数导数，
//! 用于检查、绘图和批量汇总推荐截断能。
//!
//! ## 子命令
//! - `inspect`  - 单个报告的元数据、数据段和推荐截断能
//! - `plot`     - 绘制或导出报告中的曲线 (PNG/SVG/CSV/XY)
//! - `collect`  - 并行解析目录下的报告并汇总为 CSV
//! - `validate` - 检查赝势表清单 (.djson)
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (报告与清单解析器)
//!   │     ├── plot/      (绘图与数据导出)
//!   │     ├── batch/     (批量并行处理)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod plot;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
