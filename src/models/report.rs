//! # ONCVPSP 报告数据模型
//!
//! 一次解析的完整结果：运行元数据 + 各角动量通道的径向函数与曲线。
//!
//! ## 依赖关系
//! - 被 `parsers/oncvpsp/` 构造
//! - 被 `plot/`, `commands/` 使用
//! - 使用 `models/series.rs`

use crate::models::series::{
    AePs, ConvergenceSeries, LogDerivSeries, NlState, RadialSeries,
};
use crate::plot::Plotter;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// 相对论处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CalcType {
    NonRelativistic,
    ScalarRelativistic,
    FullyRelativistic,
}

impl CalcType {
    /// 从报告中的模式标记解析
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "non-relativistic" => Some(CalcType::NonRelativistic),
            "scalar-relativistic" => Some(CalcType::ScalarRelativistic),
            "fully-relativistic" | "relativistic" => Some(CalcType::FullyRelativistic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CalcType::NonRelativistic => "non-relativistic",
            CalcType::ScalarRelativistic => "scalar-relativistic",
            CalcType::FullyRelativistic => "fully-relativistic",
        }
    }
}

impl fmt::Display for CalcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<&str> for CalcType {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// 参考组态中的一个轨道
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitalOccupation {
    pub state: NlState,
    /// 占据数
    pub occupation: f64,
}

/// 运行元数据（报告头部的输入回显）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    /// 元素符号
    pub atsym: String,
    /// 原子序数（保持报告中的原始写法，如 "8.00"）
    pub z: String,
    /// 交换关联泛函编号
    pub iexc: String,
    pub calc_type: CalcType,
    pub lmax: u32,

    /// 生成程序版本
    pub version: String,
    /// 生成日期
    pub gendate: Option<String>,
    /// 芯态数目
    pub nc: usize,
    /// 价态数目
    pub nv: usize,
    /// 输出的赝势文件格式 (psp8, upf, ...)
    pub psfile: Option<String>,
    pub core: Vec<OrbitalOccupation>,
    pub valence: Vec<OrbitalOccupation>,
    /// 各通道截断半径 (l, rc)
    pub rc: Vec<(u32, f64)>,
    /// 局域势通道，lloc > lmax 表示单独构造的局域势
    pub lloc: Option<u32>,
    /// 模型芯电荷开关
    pub icmod: Option<u32>,
}

impl RunMetadata {
    pub fn fully_relativistic(&self) -> bool {
        self.calc_type == CalcType::FullyRelativistic
    }

    /// 最小截断半径
    pub fn rc_min(&self) -> Option<f64> {
        self.rc.iter().map(|(_, rc)| *rc).reduce(f64::min)
    }

    /// 最大截断半径
    pub fn rc_max(&self) -> Option<f64> {
        self.rc.iter().map(|(_, rc)| *rc).reduce(f64::max)
    }

    /// 是否包含非线性芯修正
    pub fn has_nlcc(&self) -> bool {
        self.icmod.map(|i| i > 0).unwrap_or(false)
    }
}

/// 势函数通道：半局域势 V_l 或局域势 V_loc
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PotentialChannel {
    Semilocal(u32),
    Local,
}

impl fmt::Display for PotentialChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PotentialChannel::Semilocal(l) => write!(f, "V_l={}", l),
            PotentialChannel::Local => write!(f, "V_loc"),
        }
    }
}

/// 推荐截断能 (Ha)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CutoffHints {
    pub low: f64,
    pub normal: f64,
    pub high: f64,
}

impl CutoffHints {
    /// low / normal / high 对应的每电子能量误差 (Ha)
    pub const TOLERANCES: [f64; 3] = [1e-3, 1e-4, 1e-5];
}

/// ONCVPSP 报告解析结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OncvReport {
    pub metadata: RunMetadata,
    /// 是否读到 "DATA FOR PLOTTING"（生成正常结束）
    pub run_completed: bool,
    /// 报告中的 WARNING 行
    pub warnings: Vec<String>,
    /// rhoV, rhoC, rhoM
    pub densities: BTreeMap<String, RadialSeries>,
    pub potentials: BTreeMap<PotentialChannel, RadialSeries>,
    pub radial_wfs: AePs<BTreeMap<NlState, RadialSeries>>,
    /// 散射态，键为 (投影子序号, l)
    pub scattering_wfs: AePs<BTreeMap<NlState, RadialSeries>>,
    pub projectors: BTreeMap<NlState, RadialSeries>,
    /// 按 l 索引
    pub ene_vs_ecut: Vec<ConvergenceSeries>,
    pub atan_logders: AePs<BTreeMap<u32, LogDerivSeries>>,
}

impl OncvReport {
    pub const DENSITY_KEYS: [&'static str; 3] = ["rhoV", "rhoC", "rhoM"];

    pub fn calc_type(&self) -> CalcType {
        self.metadata.calc_type
    }

    pub fn fully_relativistic(&self) -> bool {
        self.metadata.fully_relativistic()
    }

    pub fn lmax(&self) -> u32 {
        self.metadata.lmax
    }

    /// 构造只读的绘图视图（不重新解析）
    pub fn make_plotter(&self) -> Plotter<'_> {
        Plotter::new(self)
    }

    /// 由收敛曲线推导 low / normal / high 推荐截断能
    ///
    /// 每个精度取所有 l 通道的最大值并取整；任一通道达不到精度时返回 `None`。
    pub fn hints(&self) -> Option<CutoffHints> {
        if self.ene_vs_ecut.is_empty() {
            return None;
        }

        let mut hints = [f64::NEG_INFINITY; 3];
        for (hint, tol) in hints.iter_mut().zip(CutoffHints::TOLERANCES) {
            for conv in &self.ene_vs_ecut {
                *hint = hint.max(conv.ecut_for_tolerance(tol)?);
            }
        }

        Some(CutoffHints {
            low: hints[0].round(),
            normal: hints[1].round(),
            high: hints[2].round(),
        })
    }
}
