// crates/vx_config/src/lib.rs

//! VEXIS-CAE 配置层
//!
//! 提供分析管线的全部可配置项：求解器路径、几何容差、部件命名、
//! 批处理目录与参数覆盖。配置从 JSON 文件加载，加载后立即校验，
//! 之后作为不可变上下文注入管线。
//!
//! # 模块概览
//!
//! - [`analysis_config`]: [`AnalysisConfig`] 主配置结构
//! - [`error`]: 配置错误类型

#![warn(missing_docs)]

pub mod analysis_config;
pub mod error;

pub use analysis_config::AnalysisConfig;
pub use error::ConfigError;
