//! # 数据模型模块
//!
//! 定义 ONCVPSP 报告解析结果和赝势表元数据。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `plot/` 和 `commands/` 使用
//! - 子模块: series, report, dojo_info

pub mod dojo_info;
pub mod report;
pub mod series;

pub use dojo_info::DojoTableManifest;
pub use report::{
    CalcType, CutoffHints, OncvReport, OrbitalOccupation, PotentialChannel, RunMetadata,
};
pub use series::{AePs, ConvergenceSeries, LogDerivSeries, NlState, RadialSeries};
