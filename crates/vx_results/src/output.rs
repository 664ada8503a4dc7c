// crates/vx_results/src/output.rs

//! 结果写出
//!
//! CSV：表头 `stroke,force`，Unix 换行，六位有效数字。
//! 曲线：matplotlib 后端的力-行程图，PNG 落盘。

use plotpy::{Curve, Plot};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::error::{ResultsError, ResultsResult};
use crate::extract::ForceStrokePoint;

/// 写两列 CSV；空序列时只写表头
pub fn write_csv(points: &[ForceStrokePoint], path: &Path) -> ResultsResult<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    w.write_all(b"stroke,force\n")?;
    for p in points {
        writeln!(w, "{:.5e},{:.5e}", p.stroke, p.force)?;
    }
    w.flush()?;

    info!("Wrote CSV: {} ({} rows)", path.display(), points.len());
    Ok(())
}

/// 绘制力-行程曲线并保存
pub fn plot_force_stroke(
    points: &[ForceStrokePoint],
    title: &str,
    path: &Path,
) -> ResultsResult<()> {
    let strokes: Vec<f64> = points.iter().map(|p| p.stroke).collect();
    let forces: Vec<f64> = points.iter().map(|p| p.force).collect();

    let mut curve = Curve::new();
    curve
        .set_line_width(2.0)
        .set_marker_style("o")
        .set_marker_size(4.0)
        .set_label("Indenter reaction");
    curve.draw(&strokes, &forces);

    let mut plot = Plot::new();
    plot.add(&curve)
        .set_title(title)
        .grid_and_labels("Stroke (mm)", "Reaction force (N)");
    plot.legend();
    plot.save(path).map_err(|e| ResultsError::Plot {
        message: e.to_string(),
    })?;

    info!("Wrote plot: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");
        let points = vec![
            ForceStrokePoint {
                stroke: 0.0,
                force: 0.0,
            },
            ForceStrokePoint {
                stroke: 0.05,
                force: 1.234567,
            },
        ];

        write_csv(&points, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "stroke,force");
        assert_eq!(lines.len(), 3);
        // 六位有效数字
        assert!(lines[2].starts_with("5.00000e-2,1.23457e0"));
        // Unix 换行
        assert!(!content.contains('\r'));
    }

    #[test]
    fn test_empty_csv_has_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_csv(&[], &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "stroke,force\n");
    }

    #[test]
    fn test_csv_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let points = vec![ForceStrokePoint {
            stroke: 0.1,
            force: -2.0,
        }];
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        write_csv(&points, &a).unwrap();
        write_csv(&points, &b).unwrap();
        assert_eq!(
            std::fs::read_to_string(&a).unwrap(),
            std::fs::read_to_string(&b).unwrap()
        );
    }
}
