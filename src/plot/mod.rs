//! # 绘图模块
//!
//! 把解析好的 ONCVPSP 报告投影成可直接绘制的图形数据 (`Figure`)，
//! 再交给 `render` (PNG/SVG) 或 `export` (CSV/XY) 输出。
//!
//! `Plotter` 只借用报告，不持有任何状态，可随时重新构造。
//!
//! ## 依赖关系
//! - 被 `models/report.rs` (`make_plotter`) 和 `commands/plot.rs` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: render, export

pub mod export;
pub mod render;

use crate::models::{NlState, OncvReport, RadialSeries};
use crate::models::series::l_to_char;

/// 一条曲线
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

impl Curve {
    pub fn new(label: impl Into<String>, points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self {
            label: label.into(),
            points: points.into_iter().collect(),
        }
    }

    fn from_radial(label: impl Into<String>, series: &RadialSeries) -> Self {
        Self::new(label, series.points())
    }
}

/// 一张图：标题、坐标轴说明和若干曲线
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub curves: Vec<Curve>,
}

impl Figure {
    fn new(title: String, x_desc: &str, y_desc: &str) -> Self {
        Self {
            title,
            x_desc: x_desc.to_string(),
            y_desc: y_desc.to_string(),
            curves: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.curves.iter().all(|c| c.points.is_empty())
    }

    /// 所有曲线的 x 范围
    pub fn x_range(&self) -> Option<(f64, f64)> {
        self.range(|(x, _)| x)
    }

    /// 所有曲线的 y 范围
    pub fn y_range(&self) -> Option<(f64, f64)> {
        self.range(|(_, y)| y)
    }

    fn range(&self, pick: impl Fn((f64, f64)) -> f64) -> Option<(f64, f64)> {
        self.curves
            .iter()
            .flat_map(|c| c.points.iter().copied().map(&pick))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// 报告的只读绘图视图
#[derive(Debug, Clone, Copy)]
pub struct Plotter<'a> {
    report: &'a OncvReport,
}

impl<'a> Plotter<'a> {
    pub fn new(report: &'a OncvReport) -> Self {
        Self { report }
    }

    fn title(&self, what: &str) -> String {
        format!("{} {}", self.report.metadata.atsym, what)
    }

    /// 价电荷、芯电荷与模型芯电荷密度
    pub fn densities(&self) -> Figure {
        let mut fig = Figure::new(self.title("charge densities"), "r (Bohr)", "rho");
        for key in OncvReport::DENSITY_KEYS {
            if let Some(series) = self.report.densities.get(key) {
                fig.curves.push(Curve::from_radial(key, series));
            }
        }
        fig
    }

    /// 半局域势与局域势
    pub fn potentials(&self) -> Figure {
        let mut fig = Figure::new(self.title("pseudopotentials"), "r (Bohr)", "V (Ha)");
        for (channel, series) in &self.report.potentials {
            fig.curves.push(Curve::from_radial(channel.to_string(), series));
        }
        fig
    }

    /// 束缚态径向波函数 (AE 与 PS 成对)
    pub fn radial_wfs(&self) -> Figure {
        let mut fig = Figure::new(self.title("radial wavefunctions"), "r (Bohr)", "phi(r)");
        push_ae_ps(
            &mut fig,
            &self.report.radial_wfs.ae,
            &self.report.radial_wfs.ps,
            |state| state.to_string(),
        );
        fig
    }

    /// 散射态波函数
    pub fn scattering_wfs(&self) -> Figure {
        let mut fig = Figure::new(self.title("scattering states"), "r (Bohr)", "phi(r)");
        push_ae_ps(
            &mut fig,
            &self.report.scattering_wfs.ae,
            &self.report.scattering_wfs.ps,
            |state| format!("{} iprj={}", l_to_char(state.l), state.n),
        );
        fig
    }

    /// 非局域投影子
    pub fn projectors(&self) -> Figure {
        let mut fig = Figure::new(self.title("projectors"), "r (Bohr)", "chi(r)");
        for (state, series) in &self.report.projectors {
            fig.curves.push(Curve::from_radial(
                format!("l={} iprj={}", state.l, state.n),
                series,
            ));
        }
        fig
    }

    /// 能量误差随截断能的收敛曲线
    pub fn ene_vs_ecut(&self) -> Figure {
        let mut fig = Figure::new(
            self.title("convergence"),
            "Ecut (Ha)",
            "energy error per electron (Ha)",
        );
        for conv in &self.report.ene_vs_ecut {
            fig.curves
                .push(Curve::new(format!("l={}", conv.l), conv.points()));
        }
        fig
    }

    /// arctan 对数导数
    pub fn atan_logders(&self) -> Figure {
        let mut fig = Figure::new(self.title("arctan log derivatives"), "E (Ha)", "atan(dlog)");
        for (l, ae) in &self.report.atan_logders.ae {
            fig.curves.push(Curve::new(format!("AE l={}", l), ae.points()));
            if let Some(ps) = self.report.atan_logders.ps.get(l) {
                fig.curves.push(Curve::new(format!("PS l={}", l), ps.points()));
            }
        }
        fig
    }
}

fn push_ae_ps(
    fig: &mut Figure,
    ae: &std::collections::BTreeMap<NlState, RadialSeries>,
    ps: &std::collections::BTreeMap<NlState, RadialSeries>,
    name: impl Fn(&NlState) -> String,
) {
    for (state, series) in ae {
        fig.curves
            .push(Curve::from_radial(format!("AE {}", name(state)), series));
        if let Some(series) = ps.get(state) {
            fig.curves
                .push(Curve::from_radial(format!("PS {}", name(state)), series));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::oncvpsp::OncvParser;

    const SR_REPORT: &str = include_str!("../../testdata/08_O_sr.out");

    fn report() -> OncvReport {
        OncvParser::new().parse(SR_REPORT).unwrap()
    }

    fn all_figures(p: &Plotter) -> Vec<Figure> {
        vec![
            p.densities(),
            p.potentials(),
            p.radial_wfs(),
            p.scattering_wfs(),
            p.projectors(),
            p.ene_vs_ecut(),
            p.atan_logders(),
        ]
    }

    #[test]
    fn test_make_plotter_is_idempotent() {
        let report = report();
        let first = all_figures(&report.make_plotter());
        let second = all_figures(&report.make_plotter());
        assert_eq!(first, second);
        assert!(first.iter().all(|f| !f.is_empty()));
    }

    #[test]
    fn test_figures_reflect_report() {
        let report = report();
        let plotter = report.make_plotter();

        let pots = plotter.potentials();
        let labels: Vec<_> = pots.curves.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["V_l=0", "V_l=1", "V_loc"]);
        assert_eq!(pots.curves[0].points[0].1, -7.4449470);

        let wfs = plotter.radial_wfs();
        assert_eq!(wfs.curves[0].label, "AE 1s");
        assert_eq!(wfs.curves[1].label, "PS 1s");
        assert_eq!(wfs.curves[1].points[0], (0.009945, 0.015273));

        let ecut = plotter.ene_vs_ecut();
        assert_eq!(ecut.curves.len(), 2);
        assert_eq!(ecut.x_range(), Some((5.019345, 33.812477)));
    }

    #[test]
    fn test_empty_figure_has_no_range() {
        let fig = Figure::new("empty".into(), "x", "y");
        assert!(fig.is_empty());
        assert_eq!(fig.x_range(), None);
    }
}
