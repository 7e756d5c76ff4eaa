//! # inspect 命令实现
//!
//! 解析单个 ONCVPSP 报告并打印概要。
//!
//! ## 功能
//! - 运行元数据（元素、泛函、组态、截断半径）
//! - 各数据段的条目数与径向网格范围
//! - 各 l 通道及整体的推荐截断能
//! - 报告中的 WARNING 行
//!
//! ## 依赖关系
//! - 使用 `cli/inspect.rs` 定义的参数
//! - 使用 `parsers/oncvpsp`
//! - 使用 `utils/output.rs`

use crate::cli::inspect::InspectArgs;
use crate::error::Result;
use crate::models::{CutoffHints, OncvReport, OrbitalOccupation, RadialSeries, RunMetadata};
use crate::parsers::oncvpsp::parse_oncv_file;
use crate::utils::output;

use serde::Serialize;
use tabled::{Table, Tabled};

/// 执行 inspect 命令
pub fn execute(args: InspectArgs) -> Result<()> {
    let report = parse_oncv_file(&args.report)?;

    if args.json {
        let summary = JsonSummary {
            file: args.report.display().to_string(),
            fully_relativistic: report.fully_relativistic(),
            metadata: &report.metadata,
            run_completed: report.run_completed,
            warnings: &report.warnings,
            hints: report.hints(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    output::print_header(&format!("ONCVPSP report: {}", args.report.display()));
    print_metadata(&report.metadata);
    if let Some(rhom) = report.densities.get("rhoM") {
        let model_core = if rhom.is_zero() { "none (rhoM = 0)" } else { "present" };
        output::print_field("Model core", model_core);
    }

    output::print_header("Sections");
    println!("{}", Table::new(section_rows(&report)));

    output::print_header("Cutoff hints (Ha)");
    println!("{}", Table::new(hint_rows(&report)));
    match report.hints() {
        Some(h) => output::print_success(&format!(
            "low {:.0}, normal {:.0}, high {:.0}",
            h.low, h.normal, h.high
        )),
        None => output::print_warning("Some channel never reaches the tightest tolerance"),
    }

    for conv in report.ene_vs_ecut.iter().filter(|c| !c.is_monotonic()) {
        output::print_warning(&format!(
            "Energy error for l={} does not decrease monotonically with Ecut",
            conv.l
        ));
    }

    if !report.warnings.is_empty() {
        output::print_separator();
        for warning in &report.warnings {
            output::print_warning(warning);
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    file: String,
    fully_relativistic: bool,
    metadata: &'a RunMetadata,
    run_completed: bool,
    warnings: &'a [String],
    hints: Option<CutoffHints>,
}

fn print_metadata(meta: &RunMetadata) {
    output::print_field("Element", &format!("{} (Z = {})", meta.atsym, meta.z));
    output::print_field("Calculation", meta.calc_type.as_str());
    output::print_field("Generator", &meta.version);
    if let Some(date) = &meta.gendate {
        output::print_field("Generated", date);
    }
    output::print_field("iexc", &meta.iexc);
    output::print_field("lmax", &meta.lmax.to_string());
    output::print_field("Core", &configuration(&meta.core));
    output::print_field("Valence", &configuration(&meta.valence));

    let rc: Vec<String> = meta
        .rc
        .iter()
        .map(|(l, rc)| format!("l={}: {:.2}", l, rc))
        .collect();
    output::print_field("rc (Bohr)", &rc.join(", "));
    if let (Some(lo), Some(hi)) = (meta.rc_min(), meta.rc_max()) {
        output::print_field("rc range", &format!("{:.2} - {:.2}", lo, hi));
    }

    if let Some(lloc) = meta.lloc {
        let kind = if lloc > meta.lmax { "polynomial" } else { "semilocal channel" };
        output::print_field("lloc", &format!("{} ({})", lloc, kind));
    }
    output::print_field("NLCC", if meta.has_nlcc() { "yes" } else { "no" });
    if let Some(psfile) = &meta.psfile {
        output::print_field("psfile", psfile);
    }
}

fn configuration(orbitals: &[OrbitalOccupation]) -> String {
    if orbitals.is_empty() {
        return "-".to_string();
    }
    orbitals
        .iter()
        .map(|o| format!("{}^{}", o.state, o.occupation))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Tabled)]
struct SectionRow {
    #[tabled(rename = "Section")]
    name: &'static str,
    #[tabled(rename = "Curves")]
    curves: usize,
    #[tabled(rename = "Points")]
    points: usize,
    #[tabled(rename = "Range")]
    range: String,
}

fn radial_row<'a>(
    name: &'static str,
    series: impl Iterator<Item = &'a RadialSeries> + Clone,
) -> SectionRow {
    let first = series.clone().next();
    SectionRow {
        name,
        curves: series.clone().count(),
        points: series.map(RadialSeries::num_points).sum(),
        range: first
            .and_then(|s| Some(format!("r = {:.4} - {:.4}", s.first()?.0, s.last()?.0)))
            .unwrap_or_else(|| "-".to_string()),
    }
}

fn section_rows(report: &OncvReport) -> Vec<SectionRow> {
    let mut rows = vec![
        radial_row("densities", report.densities.values()),
        radial_row("potentials", report.potentials.values()),
        radial_row("bound wfs (AE)", report.radial_wfs.ae.values()),
        radial_row("scattering wfs (AE)", report.scattering_wfs.ae.values()),
        radial_row("projectors", report.projectors.values()),
    ];

    let ecut_lo = report
        .ene_vs_ecut
        .iter()
        .filter_map(|c| c.first())
        .map(|(e, _)| e)
        .reduce(f64::min);
    let ecut_hi = report
        .ene_vs_ecut
        .iter()
        .filter_map(|c| c.last())
        .map(|(e, _)| e)
        .reduce(f64::max);
    rows.push(SectionRow {
        name: "ecut convergence",
        curves: report.ene_vs_ecut.len(),
        points: report.ene_vs_ecut.iter().map(|c| c.ecuts.len()).sum(),
        range: match (ecut_lo, ecut_hi) {
            (Some(lo), Some(hi)) => format!("Ecut = {:.1} - {:.1}", lo, hi),
            _ => "-".to_string(),
        },
    });

    let logders = &report.atan_logders.ae;
    let first = logders.values().next();
    rows.push(SectionRow {
        name: "log derivatives (AE)",
        curves: logders.len(),
        points: logders.values().map(|s| s.energies.len()).sum(),
        range: first
            .and_then(|s| Some(format!("E = {:.2} - {:.2}", s.first()?.0, s.last()?.0)))
            .unwrap_or_else(|| "-".to_string()),
    });

    rows
}

#[derive(Tabled)]
struct HintRow {
    #[tabled(rename = "l")]
    l: u32,
    #[tabled(rename = "low (1e-3)")]
    low: String,
    #[tabled(rename = "normal (1e-4)")]
    normal: String,
    #[tabled(rename = "high (1e-5)")]
    high: String,
}

fn hint_rows(report: &OncvReport) -> Vec<HintRow> {
    let fmt = |v: Option<f64>| v.map(|e| format!("{:.1}", e)).unwrap_or_else(|| "-".into());
    report
        .ene_vs_ecut
        .iter()
        .map(|conv| {
            let [low, normal, high] = CutoffHints::TOLERANCES.map(|tol| conv.ecut_for_tolerance(tol));
            HintRow {
                l: conv.l,
                low: fmt(low),
                normal: fmt(normal),
                high: fmt(high),
            }
        })
        .collect()
}
