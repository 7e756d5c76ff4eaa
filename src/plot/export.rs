//! # 图形数据导出
//!
//! 把 `Figure` 中的曲线导出为 CSV 或 XY 文本。
//!
//! ## 支持格式
//! - CSV: 长表格式，每行 `curve, x, y`
//! - XY: 每条曲线一个数据块，块前以 `#` 注释给出曲线名，块间空行分隔
//!
//! ## 依赖关系
//! - 被 `commands/plot.rs` 调用
//! - 使用 `plot/mod.rs` 的 Figure 结构
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{DojoError, Result};
use crate::plot::Figure;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 导出为 CSV 格式
pub fn to_csv(figure: &Figure, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["curve", "x", "y"])?;
    for curve in &figure.curves {
        for (x, y) in &curve.points {
            wtr.write_record([curve.label.clone(), format!("{:.7}", x), format!("{:.7}", y)])?;
        }
    }

    wtr.flush().map_err(|e| DojoError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 导出为 XY 格式
pub fn to_xy(figure: &Figure, output_path: &Path) -> Result<()> {
    let file = File::create(output_path).map_err(|e| DojoError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    write_xy(figure, &mut BufWriter::new(file)).map_err(|e| DojoError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })
}

fn write_xy<W: Write>(figure: &Figure, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "# {}", figure.title)?;
    writeln!(out, "# Columns: {}, {}", figure.x_desc, figure.y_desc)?;

    for curve in &figure.curves {
        writeln!(out)?;
        writeln!(out, "# {}", curve.label)?;
        for (x, y) in &curve.points {
            writeln!(out, "{:.7}\t{:.7}", x, y)?;
        }
    }

    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::Curve;
    use std::fs;

    fn figure() -> Figure {
        Figure {
            title: "O convergence".into(),
            x_desc: "Ecut (Ha)".into(),
            y_desc: "dE (Ha)".into(),
            curves: vec![
                Curve::new("l=0", vec![(5.0, 0.01), (10.0, 0.001)]),
                Curve::new("l=1", vec![(20.0, 0.01)]),
            ],
        }
    }

    #[test]
    fn test_to_csv() {
        let path = std::env::temp_dir().join("psdojo_export_test.csv");
        to_csv(&figure(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "curve,x,y");
        assert_eq!(lines[1], "l=0,5.0000000,0.0100000");
        assert_eq!(lines[3], "l=1,20.0000000,0.0100000");
    }

    #[test]
    fn test_write_xy_blocks() {
        let mut buf = Vec::new();
        write_xy(&figure(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("# O convergence\n# Columns: Ecut (Ha), dE (Ha)\n"));
        assert!(text.contains("\n\n# l=1\n20.0000000\t0.0100000\n"));
        assert_eq!(text.lines().filter(|l| !l.starts_with('#') && !l.is_empty()).count(), 3);
    }
}
