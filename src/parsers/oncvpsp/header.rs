//! # 报告头部（输入回显）解析
//!
//! ONCVPSP 在报告开头回显输入文件，每个参数块由 `#` 标签行引出：
//! ```text
//! # atsym  z    nc    nv    iexc   psfile
//!     O  8.00     1     2       3   psp8
//! #   n    l    f        energy (Ha)
//!     1    0    2.00
//! # lmax
//!     1
//! #   l,   rc,      ep,       ncon, nbas, qcut
//!     0    1.35000  -0.88276    4    8    7.00000
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/oncvpsp/scanner.rs` 使用
//! - 使用 `models/report.rs`

use super::sections::{parse_index, parse_number};
use crate::error::{DojoError, Result};
use crate::models::{CalcType, NlState, OrbitalOccupation, RunMetadata};

/// 等待读取数值行的头部参数块
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderBlock {
    /// 下一行按标签名逐列对应
    Atsym { keys: Vec<String>, line_no: usize },
    /// 参考组态，直到 `#` 行或空行
    Config { line_no: usize },
    Lmax,
    /// 截断半径表，直到 `#` 行
    RcTable,
    Lloc,
    Icmod,
}

impl HeaderBlock {
    /// 识别标签行
    pub fn from_label(line: &str, line_no: usize) -> Option<Self> {
        let label = line.trim_start().strip_prefix('#')?;
        let tokens: Vec<&str> = label.split_whitespace().collect();

        match tokens.as_slice() {
            ["atsym", ..] => Some(HeaderBlock::Atsym {
                keys: tokens.iter().map(|s| s.to_string()).collect(),
                line_no,
            }),
            ["n", "l", "f", "energy", ..] => Some(HeaderBlock::Config { line_no }),
            ["lmax"] => Some(HeaderBlock::Lmax),
            ["l,", "rc,", ..] => Some(HeaderBlock::RcTable),
            ["lloc,", ..] => Some(HeaderBlock::Lloc),
            ["icmod,", ..] | ["icmod", ..] => Some(HeaderBlock::Icmod),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            HeaderBlock::Atsym { .. } => "header: atsym",
            HeaderBlock::Config { .. } => "header: reference configuration",
            HeaderBlock::Lmax => "header: lmax",
            HeaderBlock::RcTable => "header: rc",
            HeaderBlock::Lloc => "header: lloc",
            HeaderBlock::Icmod => "header: icmod",
        }
    }
}

/// 参数块读取一行后的结果
#[derive(Debug, PartialEq)]
pub enum Feed {
    /// 该块还需要后续行
    Continue(HeaderBlock),
    /// 块读取完毕
    Done,
    /// 该行不属于此块，块已结束，需重新分派该行
    Reject,
}

/// 逐步收集头部字段
#[derive(Debug, Default)]
pub struct HeaderBuilder {
    calc_type: Option<CalcType>,
    version: Option<String>,
    gendate: Option<String>,
    fields: Vec<(String, String)>,
    atsym_line: usize,
    config: Vec<OrbitalOccupation>,
    config_line: usize,
    lmax: Option<u32>,
    rc: Vec<(u32, f64)>,
    lloc: Option<u32>,
    icmod: Option<u32>,
}

impl HeaderBuilder {
    /// 记录计算模式；全相对论报告在此立即失败
    pub fn set_mode(&mut self, tag: &str, version: &str, gendate: Option<&str>) -> Result<()> {
        let calc_type = CalcType::from_tag(tag).ok_or_else(|| {
            DojoError::Other(format!("Unknown calculation mode '{}'", tag))
        })?;

        if calc_type == CalcType::FullyRelativistic {
            return Err(DojoError::UnsupportedCalculationMode {
                mode: tag.to_string(),
            });
        }

        self.calc_type = Some(calc_type);
        self.version = Some(version.to_string());
        self.gendate = gendate.map(|s| s.to_string());
        Ok(())
    }

    /// 向等待中的参数块送入一行
    pub fn feed(&mut self, block: HeaderBlock, line_no: usize, line: &str) -> Result<Feed> {
        let trimmed = line.trim();
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();

        match block {
            HeaderBlock::Config { .. } | HeaderBlock::RcTable
                if trimmed.is_empty() || trimmed.starts_with('#') =>
            {
                return Ok(Feed::Reject);
            }
            _ if trimmed.is_empty() => return Ok(Feed::Continue(block)),
            _ => {}
        }

        let name = block.name();
        let malformed = |reason: String| DojoError::MalformedRow {
            section: name.to_string(),
            line_no,
            line: trimmed.to_string(),
            reason,
        };

        match block {
            HeaderBlock::Atsym {
                keys,
                line_no: label,
            } => {
                if tokens.len() < keys.len().min(5) {
                    return Err(malformed(format!(
                        "expected {} values for '{}', found {}",
                        keys.len(),
                        keys.join(" "),
                        tokens.len()
                    )));
                }
                self.fields = keys
                    .iter()
                    .zip(&tokens)
                    .map(|(k, v)| (k.clone(), v.to_string()))
                    .collect();
                self.atsym_line = label;
                Ok(Feed::Done)
            }
            HeaderBlock::Config { line_no: label } => {
                let (n, l, f) = match tokens.as_slice() {
                    [n, l, f, ..] => (parse_index(n), parse_index(l), parse_number(f)),
                    _ => (None, None, None),
                };
                match (n, l, f) {
                    (Some(n), Some(l), Some(occupation)) => {
                        self.config.push(OrbitalOccupation {
                            state: NlState::new(n, l),
                            occupation,
                        });
                        self.config_line = label;
                        Ok(Feed::Continue(HeaderBlock::Config { line_no: label }))
                    }
                    _ => Err(malformed("expected 'n l f' values".to_string())),
                }
            }
            HeaderBlock::Lmax => {
                self.lmax = Some(first_index(&tokens).ok_or_else(|| {
                    malformed("lmax is not a non-negative integer".to_string())
                })?);
                Ok(Feed::Done)
            }
            HeaderBlock::RcTable => {
                match tokens.as_slice() {
                    [l, rc, ..] => match (parse_index(l), parse_number(rc)) {
                        (Some(l), Some(rc)) => self.rc.push((l, rc)),
                        _ => return Err(malformed("expected 'l rc' values".to_string())),
                    },
                    _ => return Err(malformed("expected 'l rc' values".to_string())),
                }
                Ok(Feed::Continue(HeaderBlock::RcTable))
            }
            HeaderBlock::Lloc => {
                self.lloc = Some(first_index(&tokens).ok_or_else(|| {
                    malformed("lloc is not a non-negative integer".to_string())
                })?);
                Ok(Feed::Done)
            }
            HeaderBlock::Icmod => {
                self.icmod = Some(first_index(&tokens).ok_or_else(|| {
                    malformed("icmod is not a non-negative integer".to_string())
                })?);
                Ok(Feed::Done)
            }
        }
    }

    /// 组装运行元数据，缺失必需块时报错
    pub fn finish(self) -> Result<RunMetadata> {
        let calc_type = self.calc_type.ok_or_else(|| missing("calculation mode line"))?;
        if self.fields.is_empty() {
            return Err(missing("header block '# atsym z nc nv iexc psfile'"));
        }
        let lmax = self.lmax.ok_or_else(|| missing("header block '# lmax'"))?;

        let field = |key: &str| -> Result<String> {
            self.fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| missing(&format!("header field '{}'", key)))
        };

        let count = |key: &str| -> Result<usize> {
            let value = field(key)?;
            value.parse().map_err(|_| DojoError::MalformedRow {
                section: "header: atsym".to_string(),
                line_no: self.atsym_line + 1,
                line: value.clone(),
                reason: format!("{} is not a non-negative integer", key),
            })
        };

        let nc = count("nc")?;
        let nv = count("nv")?;

        if !self.config.is_empty() && self.config.len() != nc + nv {
            return Err(DojoError::MalformedRow {
                section: "header: reference configuration".to_string(),
                line_no: self.config_line,
                line: format!("{} states listed", self.config.len()),
                reason: format!("expected nc + nv = {} states", nc + nv),
            });
        }
        let split = nc.min(self.config.len());
        let valence = self.config[split..].to_vec();
        let mut core = self.config;
        core.truncate(split);

        Ok(RunMetadata {
            atsym: field("atsym")?,
            z: field("z")?,
            iexc: field("iexc")?,
            calc_type,
            lmax,
            version: self.version.unwrap_or_default(),
            gendate: self.gendate,
            nc,
            nv,
            psfile: field("psfile").ok(),
            core,
            valence,
            rc: self.rc,
            lloc: self.lloc,
            icmod: self.icmod,
        })
    }
}

fn first_index(tokens: &[&str]) -> Option<u32> {
    tokens.first().and_then(|t| parse_index(t))
}

fn missing(section: &str) -> DojoError {
    DojoError::MissingSection {
        section: section.to_string(),
    }
}
