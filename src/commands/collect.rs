//! # collect 命令实现
//!
//! 并行解析目录下的 ONCVPSP 报告，把元数据和推荐截断能汇总成 CSV。
//!
//! ## 功能
//! - 按模式收集报告文件（可递归）
//! - rayon 并行解析，每个文件独立
//! - 全相对论报告记为跳过，其余解析错误记为失败
//! - 终端表格 + CSV 汇总
//!
//! ## 依赖关系
//! - 使用 `cli/collect.rs` 定义的参数
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `parsers/oncvpsp`
//! - 使用 `utils/output.rs`

use crate::batch::{BatchResult, BatchRunner, FileCollector, ProcessResult};
use crate::cli::collect::CollectArgs;
use crate::error::{DojoError, Result};
use crate::models::OncvReport;
use crate::parsers::oncvpsp::OncvParser;
use crate::utils::output;

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{Table, Tabled};

/// 终端表格最多显示的行数
const TABLE_LIMIT: usize = 20;

/// 批量解析配置，由所有工作线程共享
struct CollectConfig {
    parser: OncvParser,
}

/// 汇总 CSV 的一行
#[derive(Debug, Clone, Serialize)]
struct HintsRow {
    file: String,
    element: String,
    calc_type: String,
    lmax: u32,
    rc_min: Option<f64>,
    rc_max: Option<f64>,
    nlcc: bool,
    hint_low: Option<f64>,
    hint_normal: Option<f64>,
    hint_high: Option<f64>,
    warnings: usize,
}

impl HintsRow {
    fn from_report(path: &Path, report: &OncvReport) -> Self {
        let hints = report.hints();
        let meta = &report.metadata;
        Self {
            file: path.display().to_string(),
            element: meta.atsym.clone(),
            calc_type: meta.calc_type.to_string(),
            lmax: report.lmax(),
            rc_min: meta.rc_min(),
            rc_max: meta.rc_max(),
            nlcc: meta.has_nlcc(),
            hint_low: hints.map(|h| h.low),
            hint_normal: hints.map(|h| h.normal),
            hint_high: hints.map(|h| h.high),
            warnings: report.warnings.len(),
        }
    }
}

#[derive(Tabled)]
struct HintsTableRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Element")]
    element: String,
    #[tabled(rename = "lmax")]
    lmax: u32,
    #[tabled(rename = "Hints low/normal/high (Ha)")]
    hints: String,
}

impl From<&HintsRow> for HintsTableRow {
    fn from(row: &HintsRow) -> Self {
        let hints = match (row.hint_low, row.hint_normal, row.hint_high) {
            (Some(l), Some(n), Some(h)) => format!("{:.0} / {:.0} / {:.0}", l, n, h),
            _ => "-".to_string(),
        };
        let file = Path::new(&row.file)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| row.file.clone());
        Self {
            file,
            element: row.element.clone(),
            lmax: row.lmax,
            hints,
        }
    }
}

/// 执行 collect 命令
pub fn execute(args: CollectArgs) -> Result<()> {
    output::print_header("Collecting ONCVPSP Reports");

    let files = FileCollector::new(args.dir.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect()?;

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!(
        "Found {} reports, parsing with {} threads",
        files.len(),
        runner.jobs()
    ));

    let config = Arc::new(CollectConfig {
        parser: OncvParser::new(),
    });
    let result = runner.run(files, |file| process_file(file, &config))?;

    report_problems(&result);

    let total = result.total();
    if result.success() == 0 {
        output::print_warning("No report could be parsed.");
        return Ok(());
    }

    let rows: Vec<HintsRow> = result.rows.into_iter().map(|(_, row)| row).collect();
    print_table(&rows);
    write_csv(&rows, &args.output)?;

    output::print_separator();
    output::print_done(&format!(
        "{} of {} reports parsed ({} skipped, {} failed); summary written to '{}'",
        rows.len(),
        total,
        result.skipped.len(),
        result.failures.len(),
        args.output.display()
    ));

    Ok(())
}

/// 解析单个报告
fn process_file(path: &PathBuf, config: &Arc<CollectConfig>) -> ProcessResult<HintsRow> {
    match config.parser.parse_file(path) {
        Ok(report) => ProcessResult::Success(path.clone(), HintsRow::from_report(path, &report)),
        Err(e) if e.is_unsupported() => ProcessResult::Skipped(path.clone(), e.to_string()),
        Err(e) => ProcessResult::Failed(path.clone(), e.to_string()),
    }
}

fn report_problems(result: &BatchResult<HintsRow>) {
    for (path, reason) in &result.skipped {
        output::print_skip(path, reason);
    }

    for (path, err) in result.failures.iter().take(10) {
        output::print_failure(path, err);
    }
    if result.failures.len() > 10 {
        output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
    }
}

fn print_table(rows: &[HintsRow]) {
    let table_rows: Vec<HintsTableRow> = rows.iter().take(TABLE_LIMIT).map(Into::into).collect();
    output::print_header(&format!("Cutoff hints ({} of {})", table_rows.len(), rows.len()));
    println!("{}", Table::new(&table_rows));
}

/// 保存汇总到 CSV
fn write_csv(rows: &[HintsRow], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(|e| DojoError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SR_REPORT: &str = include_str!("../../testdata/08_O_sr.out");
    const FR_REPORT: &str = include_str!("../../testdata/08_O_r.out");

    #[test]
    fn test_collect_directory() {
        let dir = std::env::temp_dir().join("psdojo_collect_cmd");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("O_sr.out"), SR_REPORT).unwrap();
        fs::write(dir.join("O_r.out"), FR_REPORT).unwrap();
        fs::write(dir.join("O_broken.out"), &SR_REPORT[..SR_REPORT.len() / 2]).unwrap();
        fs::write(dir.join("notes.txt"), "not a report").unwrap();

        let files = FileCollector::new(dir.clone()).collect().unwrap();
        assert_eq!(files.len(), 3);

        let config = Arc::new(CollectConfig {
            parser: OncvParser::new(),
        });
        let result = BatchRunner::new(2)
            .run(files, |file| process_file(file, &config))
            .unwrap();

        assert_eq!(result.success(), 1);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert!(result.skipped[0].0.ends_with("O_r.out"));

        let row = &result.rows[0].1;
        assert_eq!(row.element, "O");
        assert_eq!(row.hint_high, Some(34.0));

        let csv_path = dir.join("hints.csv");
        let rows: Vec<HintsRow> = result.rows.into_iter().map(|(_, r)| r).collect();
        write_csv(&rows, &csv_path).unwrap();
        let content = fs::read_to_string(&csv_path).unwrap();
        assert!(content.starts_with("file,element,calc_type,lmax,rc_min,rc_max,nlcc,"));
        assert_eq!(content.lines().count(), 2);
    }
}
