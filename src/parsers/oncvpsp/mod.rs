//! # ONCVPSP 输出报告解析器
//!
//! 解析赝势生成程序 ONCVPSP 的文本输出，提取：
//! - 运行元数据（元素、Z、交换关联泛函、相对论模式、lmax）
//! - 电荷密度、半局域势与局域势
//! - 全电子 / 赝波函数、投影子
//! - 截断能收敛曲线、对数导数
//!
//! 全相对论报告不受支持，在读取任何数值数据之前即报错。
//! 任何错误都会中止整个解析，不返回部分结果。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/report.rs`, `models/series.rs`
//! - 子模块: scanner (状态机), header (头部), sections (数值行)

mod header;
mod scanner;
mod sections;

use crate::error::{DojoError, Result};
use crate::models::{
    AePs, ConvergenceSeries, LogDerivSeries, NlState, OncvReport, PotentialChannel, RadialSeries,
    RunMetadata,
};
use scanner::{Patterns, ScanOutput, Scanner};
use sections::{RawSection, SectionKind, WfKind};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// ONCVPSP 报告解析器
///
/// 持有编译好的正则表达式，可在多个线程间共享并解析任意多个报告。
#[derive(Debug, Clone, Default)]
pub struct OncvParser {
    patterns: Patterns,
}

impl OncvParser {
    pub fn new() -> Self {
        OncvParser {
            patterns: Patterns::new(),
        }
    }

    /// 解析报告文件
    pub fn parse_file(&self, path: &Path) -> Result<OncvReport> {
        let content = fs::read_to_string(path).map_err(|e| DojoError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        self.parse(&content)
    }

    /// 从字符串内容解析报告
    pub fn parse(&self, content: &str) -> Result<OncvReport> {
        let scanned = Scanner::new(&self.patterns).scan(content)?;
        assemble(scanned)
    }
}

/// 解析 ONCVPSP 报告文件
pub fn parse_oncv_file(path: &Path) -> Result<OncvReport> {
    OncvParser::new().parse_file(path)
}

/// 由扫描结果组装报告并做完整性检查
fn assemble(scanned: ScanOutput) -> Result<OncvReport> {
    let ScanOutput {
        metadata,
        mut sections,
        run_completed,
        warnings,
    } = scanned;
    let lmax = metadata.lmax;

    let densities = extract_densities(take(&mut sections, SectionKind::Densities)?);
    let potentials = extract_potentials(&metadata, &mut sections)?;

    let mut projectors = BTreeMap::new();
    for l in 0..=lmax {
        let raw = take(&mut sections, SectionKind::Projectors { l })?;
        let rmesh = raw.column(1);
        for col in 2..raw.width() {
            let state = NlState::new((col - 1) as u32, l);
            projectors.insert(
                state,
                RadialSeries::new(
                    format!("Projector {} (l={})", col - 1, l),
                    rmesh.clone(),
                    raw.column(col),
                ),
            );
        }
    }

    let mut ene_vs_ecut = Vec::with_capacity(lmax as usize + 1);
    for l in 0..=lmax {
        let raw = take(&mut sections, SectionKind::Convergence { l })?;
        ene_vs_ecut.push(ConvergenceSeries::new(l, raw.pairs(1, 2)));
    }

    let mut atan_logders = AePs::<BTreeMap<u32, LogDerivSeries>>::default();
    for l in 0..=lmax {
        let raw = take(&mut sections, SectionKind::LogDeriv { l })?;
        let energies = raw.column(1);
        atan_logders
            .ae
            .insert(l, LogDerivSeries::new(l, energies.clone(), raw.column(2)));
        atan_logders
            .ps
            .insert(l, LogDerivSeries::new(l, energies, raw.column(3)));
    }

    // 剩余的段：波函数以及 l > lmax 的额外通道
    let mut radial_wfs = AePs::<BTreeMap<NlState, RadialSeries>>::default();
    let mut scattering_wfs = AePs::<BTreeMap<NlState, RadialSeries>>::default();
    for (kind, raw) in sections {
        if let SectionKind::Wavefunction(wf) = kind {
            let (target, state, prefix) = match wf {
                WfKind::Bound(nl) => (&mut radial_wfs, nl, ""),
                WfKind::Scattering(nl) => (&mut scattering_wfs, nl, "scattering "),
            };
            let rmesh = raw.column(1);
            target.ae.insert(
                state,
                RadialSeries::new(format!("{}ae {}", prefix, state), rmesh.clone(), raw.column(2)),
            );
            target.ps.insert(
                state,
                RadialSeries::new(format!("{}ps {}", prefix, state), rmesh, raw.column(3)),
            );
        }
    }

    if radial_wfs.ae.is_empty() {
        return Err(DojoError::MissingSection {
            section: "bound-state wavefunctions ('n= , l= ' marker)".to_string(),
        });
    }

    check_mesh_group(potentials.values())?;
    check_mesh_group(
        radial_wfs
            .ae
            .values()
            .chain(radial_wfs.ps.values())
            .chain(projectors.values())
            .chain(scattering_wfs.ae.values())
            .chain(scattering_wfs.ps.values()),
    )?;

    Ok(OncvReport {
        metadata,
        run_completed,
        warnings,
        densities,
        potentials,
        radial_wfs,
        scattering_wfs,
        projectors,
        ene_vs_ecut,
        atan_logders,
    })
}

/// 取出必需的数据段
fn take(sections: &mut BTreeMap<SectionKind, RawSection>, kind: SectionKind) -> Result<RawSection> {
    sections
        .remove(&kind)
        .ok_or_else(|| DojoError::MissingSection {
            section: kind.to_string(),
        })
}

fn extract_densities(raw: RawSection) -> BTreeMap<String, RadialSeries> {
    let rmesh = raw.column(0);
    let names = ["Valence charge", "Core charge", "Model core charge"];

    OncvReport::DENSITY_KEYS
        .iter()
        .zip(names)
        .enumerate()
        .map(|(i, (key, name))| {
            (
                key.to_string(),
                RadialSeries::new(name, rmesh.clone(), raw.column(i + 1)),
            )
        })
        .collect()
}

fn extract_potentials(
    metadata: &RunMetadata,
    sections: &mut BTreeMap<SectionKind, RawSection>,
) -> Result<BTreeMap<PotentialChannel, RadialSeries>> {
    let mut potentials = BTreeMap::new();

    // l <= lmax 必需，更高的 l 若存在也一并读取
    let extra: Vec<u32> = sections
        .keys()
        .filter_map(|k| match k {
            SectionKind::Potential { l } if *l > metadata.lmax => Some(*l),
            _ => None,
        })
        .collect();

    for l in (0..=metadata.lmax).chain(extra) {
        let raw = take(sections, SectionKind::Potential { l })?;
        let channel = PotentialChannel::Semilocal(l);
        potentials.insert(
            channel,
            RadialSeries::new(channel.to_string(), raw.column(1), raw.column(2)),
        );
    }

    let local_required = metadata.lloc.map(|lloc| lloc > metadata.lmax).unwrap_or(false);
    match sections.remove(&SectionKind::LocalPotential) {
        Some(raw) => {
            let channel = PotentialChannel::Local;
            potentials.insert(
                channel,
                RadialSeries::new(channel.to_string(), raw.column(0), raw.column(1)),
            );
        }
        None if local_required => {
            return Err(DojoError::MissingSection {
                section: SectionKind::LocalPotential.to_string(),
            })
        }
        None => {}
    }

    Ok(potentials)
}

/// 同组径向函数必须共享完全相同的网格
fn check_mesh_group<'a>(mut group: impl Iterator<Item = &'a RadialSeries>) -> Result<()> {
    let reference = match group.next() {
        Some(s) => s,
        None => return Ok(()),
    };

    for other in group {
        if reference.shares_mesh(other) {
            continue;
        }

        let reason = if reference.num_points() != other.num_points() {
            format!(
                "{} points vs {} points",
                reference.num_points(),
                other.num_points()
            )
        } else {
            let (i, (a, b)) = reference
                .rmesh()
                .iter()
                .zip(other.rmesh())
                .enumerate()
                .find(|(_, (a, b))| a.to_bits() != b.to_bits())
                .unwrap_or((0, (&f64::NAN, &f64::NAN)));
            format!("radius #{} differs: {} vs {}", i, a, b)
        };

        return Err(DojoError::MeshMismatch {
            first: reference.name().to_string(),
            second: other.name().to_string(),
            reason,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CalcType;

    const NR_REPORT: &str = include_str!("../../../testdata/08_O_nr.out");
    const SR_REPORT: &str = include_str!("../../../testdata/08_O_sr.out");
    const FR_REPORT: &str = include_str!("../../../testdata/08_O_r.out");

    fn parse_oncv_content(content: &str) -> Result<OncvReport> {
        OncvParser::new().parse(content)
    }

    /// 截断到包含 marker 的行之前
    fn truncate_before(content: &str, marker: &str) -> String {
        content
            .lines()
            .take_while(|line| !line.contains(marker))
            .map(|line| format!("{}\n", line))
            .collect()
    }

    #[test]
    fn test_fully_relativistic_unsupported() {
        let err = parse_oncv_content(FR_REPORT).unwrap_err();
        assert!(err.is_unsupported());
        assert!(matches!(err, DojoError::UnsupportedCalculationMode { .. }));
    }

    #[test]
    fn test_non_relativistic_metadata_and_densities() {
        let p = parse_oncv_content(NR_REPORT).unwrap();
        assert!(!p.fully_relativistic());
        assert_eq!(p.calc_type(), CalcType::NonRelativistic);
        assert!(p.calc_type() == "non-relativistic");

        let meta = &p.metadata;
        assert_eq!(meta.atsym, "O");
        assert_eq!(meta.z, "8.00");
        assert_eq!(meta.iexc, "3");
        assert_eq!(p.lmax(), 1);
        assert_eq!(meta.nc, 1);
        assert_eq!(meta.nv, 2);
        assert!(p.run_completed);

        let rhov = &p.densities["rhoV"];
        let rhoc = &p.densities["rhoC"];
        let rhom = &p.densities["rhoM"];
        assert_eq!(rhov.rmesh()[0], 0.0100642);
        assert_eq!(rhov.rmesh()[rhov.num_points() - 1], 3.9647436);
        assert_eq!(rhoc.values()[0], 53.3293576);
        assert!(rhom.is_zero());
        assert!(rhov.shares_mesh(rhoc));
    }

    #[test]
    fn test_scalar_relativistic_potentials() {
        let p = parse_oncv_content(SR_REPORT).unwrap();
        assert!(!p.fully_relativistic());
        assert!(p.calc_type() == "scalar-relativistic");
        assert_eq!(p.lmax(), 1);

        let vloc = &p.potentials[&PotentialChannel::Local];
        let first = [
            (PotentialChannel::Semilocal(0), -7.4449470),
            (PotentialChannel::Semilocal(1), -14.6551019),
            (PotentialChannel::Local, -9.5661177),
        ];
        assert_eq!(p.potentials.len(), 3);
        for (channel, v0) in first {
            let pot = &p.potentials[&channel];
            assert_eq!(pot.first(), Some((0.0099448, v0)));
            assert_eq!(pot.last().map(|(r, _)| r), Some(3.9647436));
            assert!(pot.shares_mesh(vloc));
        }
    }

    #[test]
    fn test_scalar_relativistic_wavefunctions() {
        let p = parse_oncv_content(SR_REPORT).unwrap();
        let (ae_wfs, ps_wfs) = (&p.radial_wfs.ae, &p.radial_wfs.ps);

        let (ae10, ps10) = (&ae_wfs[&NlState::new(1, 0)], &ps_wfs[&NlState::new(1, 0)]);
        assert_eq!(ae10.first(), Some((0.009945, -0.092997)));
        assert_eq!(ps10.first(), Some((0.009945, 0.015273)));
        assert_eq!(ae10.last(), Some((3.964744, 0.037697)));
        assert_eq!(ps10.last(), Some((3.964744, 0.037694)));

        let (ae21, ps21) = (&ae_wfs[&NlState::new(2, 1)], &ps_wfs[&NlState::new(2, 1)]);
        assert_eq!(ae21.first(), Some((0.009945, 0.001463)));
        assert_eq!(ps21.first(), Some((0.009945, 0.000396)));

        assert_eq!(p.scattering_wfs.ae.len(), 2);
        assert!(p.scattering_wfs.ps.contains_key(&NlState::new(2, 0)));
    }

    #[test]
    fn test_scalar_relativistic_projectors() {
        let p = parse_oncv_content(SR_REPORT).unwrap();
        let prjs = &p.projectors;
        assert_eq!(prjs.len(), 4);
        assert_eq!(prjs[&NlState::new(1, 0)].first(), Some((0.009945, 0.015274)));
        assert_eq!(prjs[&NlState::new(2, 0)].first(), Some((0.009945, -0.009284)));
        assert_eq!(prjs[&NlState::new(1, 0)].last(), Some((3.964744, 0.037697)));
        assert_eq!(prjs[&NlState::new(2, 0)].last(), Some((3.964744, 0.330625)));
        assert_eq!(prjs[&NlState::new(1, 1)].first(), Some((0.009945, 0.000395)));
        assert_eq!(prjs[&NlState::new(2, 1)].first(), Some((0.009945, -0.000282)));
    }

    #[test]
    fn test_scalar_relativistic_convergence() {
        let p = parse_oncv_content(SR_REPORT).unwrap();
        let c = &p.ene_vs_ecut;
        assert_eq!(c.len(), 2);
        assert_eq!(c[0].first(), Some((5.019345, 0.010000)));
        assert_eq!(c[0].last(), Some((25.317286, 0.000010)));
        assert_eq!(c[1].first(), Some((19.469226, 0.010000)));
        for series in c {
            assert!(series.ecuts.windows(2).all(|w| w[0] < w[1]));
            assert!(series.is_monotonic());
        }

        let hints = p.hints().unwrap();
        assert!(hints.low <= hints.normal && hints.normal <= hints.high);
        assert_eq!(hints.high, 34.0);
    }

    #[test]
    fn test_scalar_relativistic_logders() {
        let p = parse_oncv_content(SR_REPORT).unwrap();
        let (ae0, ps0) = (&p.atan_logders.ae[&0], &p.atan_logders.ps[&0]);
        assert_eq!(ae0.first(), Some((2.0, 0.706765)));
        assert_eq!(ps0.first(), Some((2.0, 0.703758)));
        assert_eq!(ae0.last(), Some((-2.0, 3.906687)));
        assert_eq!(ps0.last(), Some((-2.0, 3.906357)));

        let (ae1, ps1) = (&p.atan_logders.ae[&1], &p.atan_logders.ps[&1]);
        assert_eq!(ae1.first(), Some((2.0, -2.523018)));
        assert_eq!(ps1.values[0], -2.521334);
        assert_eq!(ae1.energies, ps1.energies);
    }

    #[test]
    fn test_truncated_report_missing_section() {
        let truncated = truncate_before(SR_REPORT, "log derivativve data for plotting");
        match parse_oncv_content(&truncated) {
            Err(DojoError::MissingSection { section }) => {
                assert_eq!(section, "log-derivatives l=0 (!)")
            }
            other => panic!("expected MissingSection, got {:?}", other),
        }

        let header_only = truncate_before(SR_REPORT, "DATA FOR PLOTTING");
        assert!(matches!(
            parse_oncv_content(&header_only),
            Err(DojoError::MissingSection { .. })
        ));
    }

    #[test]
    fn test_malformed_row_reports_context() {
        let broken = SR_REPORT.replacen("5.019345", "5.01x345", 1);
        match parse_oncv_content(&broken) {
            Err(DojoError::MalformedRow {
                section,
                line_no,
                line,
                reason,
            }) => {
                assert_eq!(section, "convergence l=0 (!C)");
                assert!(line.contains("5.01x345"));
                assert!(reason.contains("not a number"));
                let source_line = SR_REPORT.lines().nth(line_no - 1).unwrap();
                assert!(source_line.contains("5.019345"));
            }
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn test_mesh_mismatch_between_potentials() {
        let broken = SR_REPORT.replacen(" !L   0.0099448", " !L   0.0099449", 1);
        match parse_oncv_content(&broken) {
            Err(DojoError::MeshMismatch { first, second, .. }) => {
                assert_eq!(first, "V_l=0");
                assert_eq!(second, "V_loc");
            }
            other => panic!("expected MeshMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_mesh_mismatch_with_projectors() {
        let broken = SR_REPORT.replacen("@     0   0.011595", "@     0   0.011596", 1);
        match parse_oncv_content(&broken) {
            Err(DojoError::MeshMismatch { first, second, reason }) => {
                assert_eq!(first, "ae 1s");
                assert_eq!(second, "Projector 1 (l=0)");
                assert!(reason.contains("radius #1"));
            }
            other => panic!("expected MeshMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_mesh_mismatch_with_scattering_states() {
        let broken = SR_REPORT.replacen(
            "&     0   0.011595     0.033703",
            "&     0   0.011596     0.033703",
            1,
        );
        match parse_oncv_content(&broken) {
            Err(DojoError::MeshMismatch { first, second, .. }) => {
                assert_eq!(first, "ae 1s");
                assert!(second.starts_with("scattering ae"));
            }
            other => panic!("expected MeshMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_wavefunction_row_with_wrong_l() {
        // 首行的 l 与标题行不符
        let broken = SR_REPORT.replacen(
            "&     1   0.009945     0.001463",
            "&     0   0.009945     0.001463",
            1,
        );
        match parse_oncv_content(&broken) {
            Err(DojoError::MalformedRow { section, reason, .. }) => {
                assert_eq!(section, "wavefunction n=2 l=1");
                assert!(reason.contains("l=0"));
            }
            other => panic!("expected MalformedRow, got {:?}", other),
        }

        // 段中途出现其他 l 的行
        let broken = SR_REPORT.replacen(
            "&     1   0.011595     0.039455",
            "&     0   0.011595     0.039455",
            1,
        );
        match parse_oncv_content(&broken) {
            Err(DojoError::MalformedRow { section, line_no, .. }) => {
                assert_eq!(section, "wavefunction");
                assert!(SR_REPORT.lines().nth(line_no - 1).unwrap().contains("0.039455"));
            }
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn test_parser_reusable_and_independent() {
        let parser = OncvParser::new();
        let a = parser.parse(SR_REPORT).unwrap();
        let b = parser.parse(SR_REPORT).unwrap();
        assert_eq!(a, b);
        assert!(parser.parse(FR_REPORT).is_err());
        assert_eq!(parser.parse(NR_REPORT).unwrap().metadata.atsym, "O");
    }
}
