// crates/vx_results/src/extract.rs

//! 刚体时程解析
//!
//! 求解器内置的刚体输出交替写出两类行：
//!
//! ```text
//! *Time = 0.05
//! *Data = z;Fz
//! 1 -0.0123 4.56
//! ```
//!
//! `Time`/`Data` 前缀可不带星号。数据行为 `<刚体id> <z位移> <z力>`。
//! 换算：行程 = 首行位移 − 当前位移（压头从正 z 向下压），
//! 反力 = −Fz。

use std::path::Path;
use tracing::{debug, warn};

use crate::error::ResultsResult;

/// 一条刚体时程行
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBodyRow {
    /// 模拟时间
    pub time: f64,
    /// 刚体 id
    pub rigid_body: i64,
    /// z 向位移
    pub disp_z: f64,
    /// z 向力
    pub force_z: f64,
}

/// 一个（行程, 反力）点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceStrokePoint {
    /// 行程（正值为压下）
    pub stroke: f64,
    /// 反力
    pub force: f64,
}

/// 解析日志文本中的刚体行
pub fn parse_rigid_body_rows(content: &str) -> Vec<RigidBodyRow> {
    let mut rows = Vec::new();
    let mut current_time: Option<f64> = None;
    let mut expect_data_row = false;

    for line in content.lines() {
        let line = line.trim();

        if line.starts_with("*Time") || line.starts_with("Time") {
            expect_data_row = false;
            if let Some((_, value)) = line.split_once('=') {
                if let Ok(t) = value.trim().parse() {
                    current_time = Some(t);
                }
            }
            continue;
        }

        if line.starts_with("*Data") || line.starts_with("Data") {
            expect_data_row = true;
            continue;
        }

        if expect_data_row {
            expect_data_row = false;
            let Some(time) = current_time else { continue };
            let mut parts = line.split_whitespace();
            // 截断的尾行在这里解析失败，按约定丢弃
            let parsed = (|| {
                let rigid_body: i64 = parts.next()?.parse().ok()?;
                let disp_z: f64 = parts.next()?.parse().ok()?;
                let force_z: f64 = parts.next()?.parse().ok()?;
                Some(RigidBodyRow {
                    time,
                    rigid_body,
                    disp_z,
                    force_z,
                })
            })();
            match parsed {
                Some(row) => rows.push(row),
                None => debug!("Discarding unparseable rigid body row: '{}'", line),
            }
        }
    }

    rows
}

/// 刚体行换算为力-行程序列
///
/// 完全相同的行程值只保留第一次出现；非单调行程视为有效的
/// 卸载数据，保持原序不排序。
pub fn to_force_stroke(rows: &[RigidBodyRow]) -> Vec<ForceStrokePoint> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let initial_z = first.disp_z;

    let mut points: Vec<ForceStrokePoint> = Vec::with_capacity(rows.len());
    for row in rows {
        let stroke = initial_z - row.disp_z;
        if points.iter().any(|p| p.stroke == stroke) {
            continue;
        }
        points.push(ForceStrokePoint {
            stroke,
            force: -row.force_z,
        });
    }
    points
}

/// 从日志文件提取力-行程序列
///
/// 没有任何刚体行时返回空序列并记录警告，由上层决定降级行为。
pub fn extract_force_stroke(log_path: &Path) -> ResultsResult<Vec<ForceStrokePoint>> {
    let content = std::fs::read_to_string(log_path)?;
    let rows = parse_rigid_body_rows(&content);
    if rows.is_empty() {
        warn!("No rigid body rows found in {}", log_path.display());
    }
    Ok(to_force_stroke(&rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
 N O N L I N E A R   S O L V E R
*Time = 0.05
*Data = z;Fz
1 2.65 0.0
*Time = 0.10
*Data = z;Fz
1 2.60 -1.5
*Time = 0.15
*Data = z;Fz
1 2.55 -3.0
";

    #[test]
    fn test_parse_rows() {
        let rows = parse_rigid_body_rows(LOG);
        assert_eq!(rows.len(), 3);
        assert!((rows[0].time - 0.05).abs() < 1e-12);
        assert_eq!(rows[0].rigid_body, 1);
        assert!((rows[2].disp_z - 2.55).abs() < 1e-12);
    }

    #[test]
    fn test_force_stroke_transform() {
        let rows = parse_rigid_body_rows(LOG);
        let points = to_force_stroke(&rows);
        assert_eq!(points.len(), 3);
        // 行程 = 初始位移 - 当前位移
        assert!((points[0].stroke - 0.0).abs() < 1e-12);
        assert!((points[1].stroke - 0.05).abs() < 1e-9);
        // 反力 = -Fz
        assert!((points[1].force - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_prefix_without_star() {
        let log = "Time = 1.0\nData = z;Fz\n2 0.5 -0.25\n";
        let rows = parse_rigid_body_rows(log);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rigid_body, 2);
    }

    #[test]
    fn test_duplicate_strokes_deduplicated() {
        let log = "\
*Time = 0.1
*Data
1 1.0 -2.0
*Time = 0.2
*Data
1 1.0 -2.5
*Time = 0.3
*Data
1 0.9 -3.0
";
        let points = to_force_stroke(&parse_rigid_body_rows(log));
        // 行程 0.0 重复，保留第一次
        assert_eq!(points.len(), 2);
        assert!((points[0].force - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_truncated_trailing_row_discarded() {
        let log = "*Time = 0.1\n*Data\n1 1.0 -2.0\n*Time = 0.2\n*Data\n1 0.9\n";
        let rows = parse_rigid_body_rows(log);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_non_monotone_stroke_preserved_in_order() {
        // 加载后卸载：行程回落，按原序保留
        let log = "\
*Time = 0.1
*Data
1 1.0 -1.0
*Time = 0.2
*Data
1 0.8 -2.0
*Time = 0.3
*Data
1 0.9 -1.2
";
        let points = to_force_stroke(&parse_rigid_body_rows(log));
        let strokes: Vec<f64> = points.iter().map(|p| p.stroke).collect();
        assert_eq!(strokes.len(), 3);
        assert!(strokes[1] > strokes[2], "unloading order must be preserved");
    }

    #[test]
    fn test_empty_log() {
        assert!(parse_rigid_body_rows("nothing here").is_empty());
        assert!(to_force_stroke(&[]).is_empty());
    }
}
