//! # 数据段定义与数值行解码
//!
//! 报告中的每个数值表由行首标记识别，每行的列布局固定：
//!
//! ```text
//! 标记  列（标记之后）               数据段
//! !r    r  rhoV  rhoC  rhoM         电荷密度
//! !p    l  r  V_l                   半局域势（每个 l 一段）
//! !L    r  V_loc                    局域势
//! &     l  r  ae  ps                波函数（需前置标题行，l 与标题行一致）
//! @     l  r  p_1 ... p_k           投影子
//! !C    l  ecut  de                 截断能收敛曲线
//! !     l  e  ae  ps                对数导数
//! ```
//!
//! 多余的尾随列被忽略（投影子除外，其列数由首行确定）。
//!
//! ## 依赖关系
//! - 被 `parsers/oncvpsp/scanner.rs` 使用
//! - 使用 `models/series.rs`

use crate::error::{DojoError, Result};
use crate::models::NlState;

use std::fmt;

/// 波函数段的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WfKind {
    /// 束缚态 (n, l)
    Bound(NlState),
    /// 散射态 (iprj, l)
    Scattering(NlState),
}

/// 数据段种类（同时作为段的唯一键）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SectionKind {
    Densities,
    Potential { l: u32 },
    LocalPotential,
    Wavefunction(WfKind),
    Projectors { l: u32 },
    Convergence { l: u32 },
    LogDeriv { l: u32 },
}

impl SectionKind {
    /// 由行首标记和键列构造（波函数段只能由标题行打开）
    pub fn from_tag(tag: &str, key: Option<u32>) -> Option<Self> {
        match (tag, key) {
            ("!r", _) => Some(SectionKind::Densities),
            ("!L", _) => Some(SectionKind::LocalPotential),
            ("!p", Some(l)) => Some(SectionKind::Potential { l }),
            ("@", Some(l)) => Some(SectionKind::Projectors { l }),
            ("!C", Some(l)) => Some(SectionKind::Convergence { l }),
            ("!", Some(l)) => Some(SectionKind::LogDeriv { l }),
            _ => None,
        }
    }

    /// 是否为已知的数据行标记
    pub fn is_row_tag(tag: &str) -> bool {
        matches!(tag, "!r" | "!p" | "!L" | "&" | "@" | "!C" | "!")
    }

    /// 以 l 作为首列键的标记
    pub fn is_keyed_tag(tag: &str) -> bool {
        matches!(tag, "!p" | "@" | "!C" | "!")
    }

    pub fn tag(&self) -> &'static str {
        match self {
            SectionKind::Densities => "!r",
            SectionKind::Potential { .. } => "!p",
            SectionKind::LocalPotential => "!L",
            SectionKind::Wavefunction(_) => "&",
            SectionKind::Projectors { .. } => "@",
            SectionKind::Convergence { .. } => "!C",
            SectionKind::LogDeriv { .. } => "!",
        }
    }

    /// 分组键 l（若有），即数据行首列应有的值
    pub fn key(&self) -> Option<u32> {
        match self {
            SectionKind::Potential { l }
            | SectionKind::Projectors { l }
            | SectionKind::Convergence { l }
            | SectionKind::LogDeriv { l } => Some(*l),
            SectionKind::Wavefunction(WfKind::Bound(nl) | WfKind::Scattering(nl)) => Some(nl.l),
            SectionKind::Densities | SectionKind::LocalPotential => None,
        }
    }

    /// 每行至少需要的数值列数（不含标记）
    fn min_columns(&self) -> usize {
        match self {
            SectionKind::Densities => 4,
            SectionKind::Potential { .. } => 3,
            SectionKind::LocalPotential => 2,
            SectionKind::Wavefunction(_) => 4,
            SectionKind::Projectors { .. } => 3,
            SectionKind::Convergence { .. } => 3,
            SectionKind::LogDeriv { .. } => 4,
        }
    }

    /// 径向网格所在列
    fn radius_column(&self) -> Option<usize> {
        match self {
            SectionKind::Densities | SectionKind::LocalPotential => Some(0),
            SectionKind::Potential { .. }
            | SectionKind::Wavefunction(_)
            | SectionKind::Projectors { .. } => Some(1),
            SectionKind::Convergence { .. } | SectionKind::LogDeriv { .. } => None,
        }
    }

    /// 首列是否为整数索引
    fn has_index_column(&self) -> bool {
        !matches!(self, SectionKind::Densities | SectionKind::LocalPotential)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::Densities => write!(f, "densities (!r)"),
            SectionKind::Potential { l } => write!(f, "potential l={} (!p)", l),
            SectionKind::LocalPotential => write!(f, "local potential (!L)"),
            SectionKind::Wavefunction(WfKind::Bound(nl)) => {
                write!(f, "wavefunction n={} l={}", nl.n, nl.l)
            }
            SectionKind::Wavefunction(WfKind::Scattering(nl)) => {
                write!(f, "scattering wavefunction iprj={} l={}", nl.n, nl.l)
            }
            SectionKind::Projectors { l } => write!(f, "projectors l={} (@)", l),
            SectionKind::Convergence { l } => write!(f, "convergence l={} (!C)", l),
            SectionKind::LogDeriv { l } => write!(f, "log-derivatives l={} (!)", l),
        }
    }
}

/// 解析浮点数，兼容 Fortran 的 `D` 指数
pub fn parse_number(tok: &str) -> Option<f64> {
    if tok.contains(['D', 'd']) {
        tok.replace(['D', 'd'], "E").parse().ok()
    } else {
        tok.parse().ok()
    }
}

/// 解析非负整数索引（允许 "1" 或 "1.0" 写法）
pub fn parse_index(tok: &str) -> Option<u32> {
    if let Ok(i) = tok.parse::<u32>() {
        return Some(i);
    }
    let x = parse_number(tok)?;
    if x >= 0.0 && x.fract() == 0.0 && x <= u32::MAX as f64 {
        Some(x as u32)
    } else {
        None
    }
}

/// 已读完的数据段
#[derive(Debug, Clone)]
pub struct RawSection {
    /// 段起始行号（标题行或首个数据行，从 1 开始）
    pub start_line: usize,
    rows: Vec<Vec<f64>>,
}

impl RawSection {
    /// 数值列数（投影子段 = 2 + 投影子个数）
    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// 取出第 i 列
    pub fn column(&self, i: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[i]).collect()
    }

    /// 取出两列组成的点对
    pub fn pairs(&self, x: usize, y: usize) -> Vec<(f64, f64)> {
        self.rows.iter().map(|row| (row[x], row[y])).collect()
    }
}

/// 逐行读取一个数据段
#[derive(Debug)]
pub struct SectionReader {
    kind: SectionKind,
    start_line: usize,
    /// 每行保留的列数，投影子段在首行确定
    width: Option<usize>,
    rows: Vec<Vec<f64>>,
}

impl SectionReader {
    pub fn new(kind: SectionKind, start_line: usize) -> Self {
        let width = match kind {
            SectionKind::Projectors { .. } => None,
            _ => Some(kind.min_columns()),
        };
        SectionReader {
            kind,
            start_line,
            width,
            rows: Vec::new(),
        }
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 该行是否属于当前段（标记相同且 l 未变化）
    ///
    /// 键列无法解析时仍视为本段的行，由 `push_row` 报告错误。
    pub fn accepts(&self, line: &str) -> bool {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some(self.kind.tag()) {
            return false;
        }
        match self.kind.key() {
            Some(key) => match tokens.next().map(parse_index) {
                Some(Some(l)) => l == key,
                _ => true,
            },
            None => true,
        }
    }

    /// 解码一个数据行
    pub fn push_row(&mut self, line_no: usize, line: &str) -> Result<()> {
        let tokens: Vec<&str> = line.split_whitespace().skip(1).collect();

        let min = self.kind.min_columns();
        if tokens.len() < min {
            return Err(self.malformed(
                line_no,
                line,
                format!(
                    "expected at least {} numeric columns, found {}",
                    min,
                    tokens.len()
                ),
            ));
        }

        let width = *self.width.get_or_insert(tokens.len());
        if tokens.len() < width {
            return Err(self.malformed(
                line_no,
                line,
                format!("expected {} columns like the first row, found {}", width, tokens.len()),
            ));
        }

        let mut row = Vec::with_capacity(width);
        for tok in &tokens[..width] {
            match parse_number(tok) {
                Some(x) if x.is_finite() => row.push(x),
                _ => {
                    return Err(self.malformed(
                        line_no,
                        line,
                        format!("'{}' is not a number", tok),
                    ))
                }
            }
        }

        if self.kind.has_index_column() && parse_index(tokens[0]).is_none() {
            return Err(self.malformed(
                line_no,
                line,
                format!("'{}' is not an angular momentum index", tokens[0]),
            ));
        }

        if let Some(col) = self.kind.radius_column() {
            if let Some(prev) = self.rows.last() {
                if row[col] <= prev[col] {
                    return Err(self.malformed(
                        line_no,
                        line,
                        format!(
                            "radius {} does not exceed previous radius {}",
                            row[col], prev[col]
                        ),
                    ));
                }
            }
        }

        self.rows.push(row);
        Ok(())
    }

    /// 标题行后没有任何数据行时使用
    pub fn empty_error(&self, line_no: usize, line: &str) -> DojoError {
        let mut tokens = line.split_whitespace();
        let tag = tokens.next();
        let reason = match (self.kind.key(), tokens.next().and_then(parse_index)) {
            (Some(key), Some(l)) if tag == Some(self.kind.tag()) && l != key => {
                format!("row belongs to l={} but the section is l={}", l, key)
            }
            _ => format!("expected '{}' rows after the section marker", self.kind.tag()),
        };
        self.malformed(line_no, line, reason)
    }

    pub fn finish(self) -> RawSection {
        RawSection {
            start_line: self.start_line,
            rows: self.rows,
        }
    }

    fn malformed(&self, line_no: usize, line: &str, reason: String) -> DojoError {
        DojoError::MalformedRow {
            section: self.kind.to_string(),
            line_no,
            line: line.trim().to_string(),
            reason,
        }
    }
}
