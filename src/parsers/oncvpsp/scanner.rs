//! # 报告扫描状态机
//!
//! 对报告逐行扫描，状态转移如下：
//! ```text
//! SeekingHeader ──(首个数据段)──> SeekingSection <──(空行/标记变化)── ReadingRows
//!      │  └─(# 标签行) 等待数值行                    └──(标题行/数据行)──┘
//!      └─(全相对论模式行) 立即失败
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/oncvpsp/mod.rs` 使用
//! - 使用 `header.rs`, `sections.rs`
//! - 使用 `regex` 识别模式行和波函数标题行

use super::header::{Feed, HeaderBlock, HeaderBuilder};
use super::sections::{parse_index, RawSection, SectionKind, SectionReader, WfKind};
use crate::error::{DojoError, Result};
use crate::models::{NlState, RunMetadata};

use regex::Regex;
use std::collections::BTreeMap;

/// 扫描所需的正则表达式，由解析器构造一次后复用
#[derive(Debug, Clone)]
pub struct Patterns {
    /// "scalar-relativistic version 2.1.1 03/26/2014"
    mode: Regex,
    /// "n= 1,  l= 0, all-electron wave function, pseudo w-f"
    /// "scattering, iprj= 2,  l= 0, all-electron wave function, pseudo w-f"
    wavefunction: Regex,
}

impl Patterns {
    pub fn new() -> Self {
        Patterns {
            mode: Regex::new(
                r"^\s*(non-relativistic|scalar-relativistic|fully-relativistic|relativistic)\s+version\s+([^\s,]+),?\s*(\S+)?",
            )
            .unwrap(),
            wavefunction: Regex::new(
                r"^\s*(?:scattering,\s*iprj=\s*(\d+)|n=\s*(\d+)),\s*l=\s*(\d+),\s*all-electron wave function",
            )
            .unwrap(),
        }
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self::new()
    }
}

/// 扫描状态
#[derive(Debug)]
enum State {
    SeekingHeader { pending: Option<HeaderBlock> },
    SeekingSection,
    ReadingRows(SectionReader),
}

/// 扫描结果：元数据 + 按种类索引的原始数据段
#[derive(Debug)]
pub struct ScanOutput {
    pub metadata: RunMetadata,
    pub sections: BTreeMap<SectionKind, RawSection>,
    pub run_completed: bool,
    pub warnings: Vec<String>,
}

/// 逐行扫描器
pub struct Scanner<'p> {
    patterns: &'p Patterns,
    state: State,
    header: HeaderBuilder,
    metadata: Option<RunMetadata>,
    sections: BTreeMap<SectionKind, RawSection>,
    run_completed: bool,
    warnings: Vec<String>,
}

impl<'p> Scanner<'p> {
    pub fn new(patterns: &'p Patterns) -> Self {
        Scanner {
            patterns,
            state: State::SeekingHeader { pending: None },
            header: HeaderBuilder::default(),
            metadata: None,
            sections: BTreeMap::new(),
            run_completed: false,
            warnings: Vec::new(),
        }
    }

    /// 扫描整个报告
    pub fn scan(mut self, content: &str) -> Result<ScanOutput> {
        for (idx, line) in content.lines().enumerate() {
            self.step(idx + 1, line)?;
        }
        self.finish(content.lines().count())
    }

    fn step(&mut self, line_no: usize, line: &str) -> Result<()> {
        let state = std::mem::replace(&mut self.state, State::SeekingSection);
        self.state = match state {
            State::SeekingHeader { pending } => self.seek_header(pending, line_no, line)?,
            State::SeekingSection => self.seek_section(line_no, line)?,
            State::ReadingRows(reader) => self.read_rows(reader, line_no, line)?,
        };
        Ok(())
    }

    fn seek_header(
        &mut self,
        pending: Option<HeaderBlock>,
        line_no: usize,
        line: &str,
    ) -> Result<State> {
        if let Some(block) = pending {
            match self.header.feed(block, line_no, line)? {
                Feed::Continue(block) => {
                    return Ok(State::SeekingHeader {
                        pending: Some(block),
                    })
                }
                Feed::Done => return Ok(State::SeekingHeader { pending: None }),
                Feed::Reject => {}
            }
        }

        if let Some(caps) = self.patterns.mode.captures(line) {
            let gendate = caps.get(3).map(|m| m.as_str());
            self.header.set_mode(&caps[1], &caps[2], gendate)?;
            return Ok(State::SeekingHeader { pending: None });
        }

        if let Some(block) = HeaderBlock::from_label(line, line_no) {
            return Ok(State::SeekingHeader {
                pending: Some(block),
            });
        }

        if self.starts_section(line) {
            let header = std::mem::take(&mut self.header);
            self.metadata = Some(header.finish()?);
            return self.seek_section(line_no, line);
        }

        self.note(line);
        Ok(State::SeekingHeader { pending: None })
    }

    fn seek_section(&mut self, line_no: usize, line: &str) -> Result<State> {
        if let Some(kind) = self.wavefunction_marker(line) {
            return Ok(State::ReadingRows(SectionReader::new(kind, line_no)));
        }

        let mut tokens = line.split_whitespace();
        let tag = match tokens.next() {
            Some(tag) if SectionKind::is_row_tag(tag) => tag,
            _ => {
                self.note(line);
                return Ok(State::SeekingSection);
            }
        };

        if tag == "&" {
            return Err(DojoError::MalformedRow {
                section: "wavefunction".to_string(),
                line_no,
                line: line.trim().to_string(),
                reason: "wavefunction row without a preceding 'n= , l= ' marker line".to_string(),
            });
        }

        let key = if SectionKind::is_keyed_tag(tag) {
            match tokens.next().and_then(parse_index) {
                Some(l) => Some(l),
                None => {
                    return Err(DojoError::MalformedRow {
                        section: format!("'{}' rows", tag),
                        line_no,
                        line: line.trim().to_string(),
                        reason: "missing angular momentum index after the row tag".to_string(),
                    })
                }
            }
        } else {
            None
        };

        // is_row_tag 已排除其余情况
        let kind = match SectionKind::from_tag(tag, key) {
            Some(kind) => kind,
            None => return Ok(State::SeekingSection),
        };

        let mut reader = SectionReader::new(kind, line_no);
        reader.push_row(line_no, line)?;
        Ok(State::ReadingRows(reader))
    }

    fn read_rows(&mut self, mut reader: SectionReader, line_no: usize, line: &str) -> Result<State> {
        if line.trim().is_empty() {
            if reader.is_empty() {
                return Ok(State::ReadingRows(reader));
            }
            self.close(reader)?;
            return Ok(State::SeekingSection);
        }

        if reader.accepts(line) {
            reader.push_row(line_no, line)?;
            return Ok(State::ReadingRows(reader));
        }

        if reader.is_empty() {
            return Err(reader.empty_error(line_no, line));
        }

        self.close(reader)?;
        self.seek_section(line_no, line)
    }

    fn finish(mut self, last_line: usize) -> Result<ScanOutput> {
        match std::mem::replace(&mut self.state, State::SeekingSection) {
            State::ReadingRows(reader) => {
                if reader.is_empty() {
                    return Err(reader.empty_error(last_line, "<end of report>"));
                }
                self.close(reader)?;
            }
            State::SeekingHeader { .. } | State::SeekingSection => {}
        }

        let metadata = match self.metadata {
            Some(metadata) => metadata,
            None => self.header.finish()?,
        };

        Ok(ScanOutput {
            metadata,
            sections: self.sections,
            run_completed: self.run_completed,
            warnings: self.warnings,
        })
    }

    fn close(&mut self, reader: SectionReader) -> Result<()> {
        let kind = reader.kind();
        let raw = reader.finish();
        if let Some(first) = self.sections.get(&kind) {
            return Err(DojoError::DuplicateSection {
                section: kind.to_string(),
                first_line: first.start_line,
                line_no: raw.start_line,
            });
        }
        self.sections.insert(kind, raw);
        Ok(())
    }

    /// 该行是否开始一个数据段（标题行或已知标记的数据行）
    fn starts_section(&self, line: &str) -> bool {
        self.patterns.wavefunction.is_match(line)
            || line
                .split_whitespace()
                .next()
                .map(SectionKind::is_row_tag)
                .unwrap_or(false)
    }

    fn wavefunction_marker(&self, line: &str) -> Option<SectionKind> {
        let caps = self.patterns.wavefunction.captures(line)?;
        let l: u32 = caps[3].parse().ok()?;
        let kind = match (caps.get(1), caps.get(2)) {
            (Some(iprj), _) => WfKind::Scattering(NlState::new(iprj.as_str().parse().ok()?, l)),
            (None, Some(n)) => WfKind::Bound(NlState::new(n.as_str().parse().ok()?, l)),
            (None, None) => return None,
        };
        Some(SectionKind::Wavefunction(kind))
    }

    /// 记录与数据段无关但有意义的行
    fn note(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.starts_with("DATA FOR PLOTTING") {
            self.run_completed = true;
        } else if trimmed.starts_with("WARNING") {
            self.warnings.push(trimmed.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "
 scalar-relativistic version 2.1.1 03/26/2014
# atsym  z    nc    nv    iexc   psfile
    O  8.00     1     2       3   psp8
# lmax
    1
";

    fn scan(body: &str) -> Result<ScanOutput> {
        let patterns = Patterns::new();
        Scanner::new(&patterns).scan(&format!("{}{}", HEADER, body))
    }

    #[test]
    fn test_mode_line_pattern() {
        let p = Patterns::new();
        let caps = p
            .mode
            .captures(" scalar-relativistic version 2.1.1, 03/26/2014")
            .unwrap();
        assert_eq!(&caps[1], "scalar-relativistic");
        assert_eq!(&caps[2], "2.1.1");
        assert_eq!(caps.get(3).map(|m| m.as_str()), Some("03/26/2014"));

        let caps = p.mode.captures("non-relativistic version 3.3.1").unwrap();
        assert_eq!(&caps[1], "non-relativistic");
        assert!(caps.get(3).is_none());
    }

    #[test]
    fn test_sections_split_on_key_and_blank() {
        let out = scan(
            "
DATA FOR PLOTTING
 !C     0    5.019345    0.010000
 !C     0    9.000000    0.001000
 !C     1   19.469226    0.010000

 !      0    2.000000    0.706765    0.703758
",
        )
        .unwrap();
        assert!(out.run_completed);
        assert_eq!(out.metadata.atsym, "O");
        assert_eq!(out.sections.len(), 3);
        assert_eq!(out.sections[&SectionKind::Convergence { l: 0 }].column(1).len(), 2);
        assert_eq!(out.sections[&SectionKind::Convergence { l: 1 }].column(1).len(), 1);
        assert_eq!(out.sections[&SectionKind::LogDeriv { l: 0 }].width(), 4);
    }

    #[test]
    fn test_wavefunction_marker_then_rows() {
        let out = scan(
            "
 n= 1,  l= 0, all-electron wave function, pseudo w-f

 &     0    0.009945   -0.092997    0.015273
 &     0    0.010145   -0.092000    0.015300

 scattering, iprj= 2,  l= 0, all-electron wave function, pseudo w-f

 &     0    0.009945    0.100000    0.090000
",
        )
        .unwrap();
        let bound = SectionKind::Wavefunction(WfKind::Bound(NlState::new(1, 0)));
        let scat = SectionKind::Wavefunction(WfKind::Scattering(NlState::new(2, 0)));
        assert_eq!(out.sections[&bound].column(1).len(), 2);
        assert_eq!(out.sections[&scat].start_line, 13);
    }

    #[test]
    fn test_orphan_wavefunction_row() {
        let err = scan("\n &     0    0.009945   -0.092997    0.015273\n").unwrap_err();
        assert!(matches!(err, DojoError::MalformedRow { .. }));
    }

    #[test]
    fn test_marker_without_rows() {
        let err = scan(
            "
 n= 1,  l= 0, all-electron wave function, pseudo w-f
 some unrelated text
",
        )
        .unwrap_err();
        match err {
            DojoError::MalformedRow { section, .. } => assert_eq!(section, "wavefunction n=1 l=0"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_section() {
        let err = scan(
            "
 !L    0.0099448   -9.5661177

 !L    0.0099448   -9.5661177
",
        )
        .unwrap_err();
        match err {
            DojoError::DuplicateSection {
                section,
                first_line,
                line_no,
            } => {
                assert_eq!(section, "local potential (!L)");
                assert_eq!(first_line, 8);
                assert_eq!(line_no, 10);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_warnings_collected() {
        let out = scan(
            "
 WARNING: highest projector energy is above the barrier
 !L    0.0099448   -9.5661177
",
        )
        .unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(!out.run_completed);
    }

    #[test]
    fn test_fully_relativistic_stops_before_rows() {
        let patterns = Patterns::new();
        let report = "
 relativistic version 3.0.0 10/10/2014
 !r   not-a-number
";
        let err = Scanner::new(&patterns).scan(report).unwrap_err();
        assert!(err.is_unsupported());
    }
}
