//! # plot 命令实现
//!
//! 解析报告，选出一组曲线，输出图像 (PNG/SVG) 或数据文件 (CSV/XY)。
//!
//! ## 依赖关系
//! - 使用 `cli/plot.rs` 定义的参数
//! - 使用 `parsers/oncvpsp`
//! - 使用 `plot/` 模块生成图形和导出数据

use crate::cli::plot::{PlotArgs, PlotFormat, PlotKind};
use crate::error::Result;
use crate::parsers::oncvpsp::parse_oncv_file;
use crate::plot::{self, Figure, Plotter};
use crate::utils::output;

use std::path::{Path, PathBuf};

/// 执行 plot 命令
pub fn execute(args: PlotArgs) -> Result<()> {
    let report = parse_oncv_file(&args.report)?;
    output::print_info(&format!(
        "Loaded {} report for {} ({})",
        report.calc_type(),
        report.metadata.atsym,
        args.report.display()
    ));
    for warning in &report.warnings {
        output::print_warning(warning);
    }

    let mut figure = select_figure(&report.make_plotter(), args.kind);
    if let Some(title) = &args.title {
        figure.title = title.clone();
    }

    let format = args
        .format
        .or_else(|| args.output.as_deref().map(guess_format_from_extension))
        .unwrap_or(PlotFormat::Png);
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.report, args.kind, format));

    match format {
        PlotFormat::Png | PlotFormat::Svg => plot::render::render_figure(
            &figure,
            &output_path,
            args.width,
            args.height,
            format == PlotFormat::Svg,
        )?,
        PlotFormat::Csv => plot::export::to_csv(&figure, &output_path)?,
        PlotFormat::Xy => plot::export::to_xy(&figure, &output_path)?,
    }

    output::print_success(&format!(
        "{} ({} curves) saved to '{}'",
        args.kind,
        figure.curves.len(),
        output_path.display()
    ));

    Ok(())
}

/// 按曲线组取图
fn select_figure(plotter: &Plotter, kind: PlotKind) -> Figure {
    match kind {
        PlotKind::Densities => plotter.densities(),
        PlotKind::Potentials => plotter.potentials(),
        PlotKind::Wfs => plotter.radial_wfs(),
        PlotKind::Scattering => plotter.scattering_wfs(),
        PlotKind::Projectors => plotter.projectors(),
        PlotKind::Ecut => plotter.ene_vs_ecut(),
        PlotKind::Logders => plotter.atan_logders(),
    }
}

/// 从文件扩展名推断输出格式
fn guess_format_from_extension(path: &Path) -> PlotFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("svg") => PlotFormat::Svg,
        Some("csv") => PlotFormat::Csv,
        Some("xy") | Some("dat") | Some("txt") => PlotFormat::Xy,
        _ => PlotFormat::Png,
    }
}

/// 默认输出文件名：`<报告名>_<曲线组>.<扩展名>`，放在当前目录
fn default_output(report: &Path, kind: PlotKind, format: PlotFormat) -> PathBuf {
    let stem = report
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report");
    let ext = match format {
        PlotFormat::Png => "png",
        PlotFormat::Svg => "svg",
        PlotFormat::Csv => "csv",
        PlotFormat::Xy => "xy",
    };
    PathBuf::from(format!("{}_{}.{}", stem, kind, ext))
}
