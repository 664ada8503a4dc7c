// crates/vx_results/src/lib.rs

//! VEXIS-CAE 结果提取
//!
//! 扫描求解器日志中的刚体时程行，换算为（行程, 反力）序列，
//! 写两列 CSV 并绘制力-行程曲线。对重复行、截断尾行与非单调
//! 行程保持健壮：去重、丢弃、按原序保留。
//!
//! # 模块结构
//!
//! - [`extract`]: 日志解析与换算
//! - [`output`]: CSV 写出与曲线绘制

#![warn(missing_docs)]

pub mod error;
pub mod extract;
pub mod output;

pub use error::{ResultsError, ResultsResult};
pub use extract::{extract_force_stroke, ForceStrokePoint, RigidBodyRow};
pub use output::{plot_force_stroke, write_csv};
