//! # 图表渲染
//!
//! 使用 `plotters` 把 `Figure` 画成 PNG 或 SVG。
//!
//! ## 依赖关系
//! - 被 `commands/plot.rs` 调用
//! - 使用 `plot/mod.rs` 的 Figure 结构
//! - 使用 `plotters` 渲染图表

use crate::error::{DojoError, Result};
use crate::plot::Figure;

use plotters::prelude::*;
use std::path::Path;

/// 曲线配色，按曲线序号循环使用
const PALETTE: [RGBColor; 8] = [
    RGBColor(0, 102, 204),
    RGBColor(204, 51, 0),
    RGBColor(0, 153, 76),
    RGBColor(153, 51, 204),
    RGBColor(230, 153, 0),
    RGBColor(0, 153, 153),
    RGBColor(204, 0, 102),
    RGBColor(96, 96, 96),
];

/// 渲染图表，`use_svg` 为 false 时输出 PNG
pub fn render_figure(
    figure: &Figure,
    output_path: &Path,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if figure.is_empty() {
        return Err(DojoError::InvalidArgument(format!(
            "'{}' has no data to plot",
            figure.title
        )));
    }

    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_figure(&root, figure)?;
        root.present()
            .map_err(|e| DojoError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_figure(&root, figure)?;
        root.present()
            .map_err(|e| DojoError::Other(e.to_string()))?;
    }
    Ok(())
}

/// 坐标轴范围：两端各留 5% 余量，退化区间扩成单位宽度
pub fn padded_range(range: (f64, f64)) -> (f64, f64) {
    let (lo, hi) = range;
    if hi - lo <= f64::EPSILON * hi.abs().max(1.0) {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// 绘制图表的核心逻辑
fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    figure: &Figure,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| DojoError::Other(format!("{:?}", e)))?;

    let (x_min, x_max) = match figure.x_range() {
        Some((lo, hi)) if hi > lo => (lo, hi),
        Some(range) => padded_range(range),
        None => (0.0, 1.0),
    };
    let (y_min, y_max) = padded_range(figure.y_range().unwrap_or((0.0, 1.0)));

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| DojoError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc(figure.x_desc.as_str())
        .y_desc(figure.y_desc.as_str())
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| DojoError::Other(format!("{:?}", e)))?;

    for (i, curve) in figure.curves.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        chart
            .draw_series(LineSeries::new(
                curve.points.iter().copied(),
                color.stroke_width(2),
            ))
            .map_err(|e| DojoError::Other(format!("{:?}", e)))?
            .label(curve.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 14))
        .draw()
        .map_err(|e| DojoError::Other(format!("{:?}", e)))?;

    Ok(())
}
