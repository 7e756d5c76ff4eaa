//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `inspect`: 单个 ONCVPSP 报告概要
//! - `plot`: 绘制或导出报告中的曲线
//! - `collect`: 并行解析目录下的报告并汇总推荐截断能
//! - `validate`: 检查赝势表清单 (.djson)
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: inspect, plot, collect, validate

pub mod collect;
pub mod inspect;
pub mod plot;
pub mod validate;

use clap::{Parser, Subcommand};

/// psdojo - ONCVPSP 赝势生成报告工具
#[derive(Parser)]
#[command(name = "psdojo")]
#[command(version)]
#[command(about = "Inspect, plot and collect ONCVPSP pseudopotential generation reports", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Print metadata, sections and cutoff hints of an ONCVPSP report
    Inspect(inspect::InspectArgs),

    /// Plot or export the radial functions and curves of a report
    Plot(plot::PlotArgs),

    /// Parse all reports in a directory and write a cutoff-hint summary
    Collect(collect::CollectArgs),

    /// Validate a pseudopotential table manifest (.djson)
    Validate(validate::ValidateArgs),
}
