//! # 径向函数与曲线数据模型
//!
//! ONCVPSP 报告中的数值数据分为两类：
//! - 径向函数 `RadialSeries`：定义在径向网格 r 上（密度、势、波函数、投影子）
//! - 能量曲线：截断能收敛曲线 `ConvergenceSeries`，对数导数 `LogDerivSeries`
//!
//! 所有数据在一次解析中构造，此后只读。
//!
//! ## 依赖关系
//! - 被 `parsers/oncvpsp/` 构造
//! - 被 `models/report.rs`, `plot/` 使用

use serde::Serialize;
use std::fmt;

/// 角动量量子数对应的光谱符号
pub fn l_to_char(l: u32) -> char {
    match l {
        0 => 's',
        1 => 'p',
        2 => 'd',
        3 => 'f',
        4 => 'g',
        _ => '?',
    }
}

/// (n, l) 量子态
///
/// 对投影子而言 `n` 是同一 l 通道内的投影子序号（从 1 开始）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NlState {
    pub n: u32,
    pub l: u32,
}

impl NlState {
    pub fn new(n: u32, l: u32) -> Self {
        NlState { n, l }
    }
}

impl fmt::Display for NlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.n, l_to_char(self.l))
    }
}

/// 径向函数：共享网格上的 (r, f(r)) 序列，r 严格递增
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadialSeries {
    name: String,
    rmesh: Vec<f64>,
    values: Vec<f64>,
}

impl RadialSeries {
    /// 由网格与函数值构造
    ///
    /// 调用方保证两者等长且网格严格递增（解析器在读取行时逐行检查）。
    pub fn new(name: impl Into<String>, rmesh: Vec<f64>, values: Vec<f64>) -> Self {
        debug_assert_eq!(rmesh.len(), values.len());
        RadialSeries {
            name: name.into(),
            rmesh,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rmesh(&self) -> &[f64] {
        &self.rmesh
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 采样点个数
    pub fn num_points(&self) -> usize {
        self.rmesh.len()
    }

    /// 第 i 个采样点 (r, value)
    pub fn point(&self, i: usize) -> Option<(f64, f64)> {
        Some((*self.rmesh.get(i)?, *self.values.get(i)?))
    }

    pub fn first(&self) -> Option<(f64, f64)> {
        self.point(0)
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        self.num_points().checked_sub(1).and_then(|i| self.point(i))
    }

    /// 按 (r, value) 迭代
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.rmesh.iter().copied().zip(self.values.iter().copied())
    }

    /// 网格是否与另一函数逐点完全一致
    pub fn shares_mesh(&self, other: &RadialSeries) -> bool {
        self.rmesh.len() == other.rmesh.len()
            && self
                .rmesh
                .iter()
                .zip(&other.rmesh)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }

    /// 函数值是否全为零（例如未启用模型芯电荷时的 rhoM）
    pub fn is_zero(&self) -> bool {
        self.values().iter().all(|v| *v == 0.0)
    }
}

/// 截断能收敛曲线 (Ecut, ΔE)，按 Ecut 递增排列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceSeries {
    pub l: u32,
    /// 截断能 (Ha)
    pub ecuts: Vec<f64>,
    /// 每电子能量误差 (Ha)
    pub values: Vec<f64>,
}

impl ConvergenceSeries {
    /// 构造并按截断能排序
    pub fn new(l: u32, points: Vec<(f64, f64)>) -> Self {
        let mut points = points;
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (ecuts, values) = points.into_iter().unzip();
        ConvergenceSeries { l, ecuts, values }
    }

    pub fn first(&self) -> Option<(f64, f64)> {
        Some((*self.ecuts.first()?, *self.values.first()?))
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        Some((*self.ecuts.last()?, *self.values.last()?))
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.ecuts.iter().copied().zip(self.values.iter().copied())
    }

    /// 达到给定能量误差所需的最小截断能
    pub fn ecut_for_tolerance(&self, tol: f64) -> Option<f64> {
        self.points().find(|(_, de)| *de <= tol).map(|(ecut, _)| ecut)
    }

    /// 能量误差是否随截断能单调不增
    pub fn is_monotonic(&self) -> bool {
        self.values.windows(2).all(|w| w[1] <= w[0])
    }
}

/// 对数导数曲线 (E, atan(r ψ'/ψ))，保持报告中的顺序
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogDerivSeries {
    pub l: u32,
    /// 能量 (Ha)
    pub energies: Vec<f64>,
    pub values: Vec<f64>,
}

impl LogDerivSeries {
    pub fn new(l: u32, energies: Vec<f64>, values: Vec<f64>) -> Self {
        LogDerivSeries {
            l,
            energies,
            values,
        }
    }

    pub fn first(&self) -> Option<(f64, f64)> {
        Some((*self.energies.first()?, *self.values.first()?))
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        Some((*self.energies.last()?, *self.values.last()?))
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.energies.iter().copied().zip(self.values.iter().copied())
    }
}

/// 全电子 / 赝势 成对数据
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AePs<T> {
    pub ae: T,
    pub ps: T,
}
