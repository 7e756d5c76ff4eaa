//! # plot 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/plot.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 要绘制的曲线组
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PlotKind {
    /// Valence, core and model core charge densities
    Densities,
    /// Semilocal and local pseudopotentials
    Potentials,
    /// Bound-state radial wavefunctions (AE and PS)
    Wfs,
    /// Scattering-state wavefunctions (AE and PS)
    Scattering,
    /// Nonlocal projectors
    Projectors,
    /// Energy error versus plane-wave cutoff
    Ecut,
    /// Arctan of the logarithmic derivatives (AE and PS)
    Logders,
}

impl std::fmt::Display for PlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlotKind::Densities => write!(f, "densities"),
            PlotKind::Potentials => write!(f, "potentials"),
            PlotKind::Wfs => write!(f, "wfs"),
            PlotKind::Scattering => write!(f, "scattering"),
            PlotKind::Projectors => write!(f, "projectors"),
            PlotKind::Ecut => write!(f, "ecut"),
            PlotKind::Logders => write!(f, "logders"),
        }
    }
}

/// 输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PlotFormat {
    /// PNG image
    Png,
    /// SVG vector image
    Svg,
    /// CSV data file (curve, x, y)
    Csv,
    /// XY data file, one block per curve
    Xy,
}

/// plot 子命令参数
#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Path to the ONCVPSP output file
    pub report: PathBuf,

    /// Which curves to plot
    #[arg(short, long, value_enum, default_value = "densities")]
    pub kind: PlotKind,

    /// Output file (default: <report stem>_<kind>.<format>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<PlotFormat>,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Title for the plot (default: element and curve group)
    #[arg(long)]
    pub title: Option<String>,
}
