// crates/vx_solver/src/lib.rs

//! VEXIS-CAE 求解器驱动
//!
//! 以子进程方式运行外部 FEA 求解器：不经过 shell，工作目录设为
//! 任务目录，标准输出按行流式读取。一条读线程阻塞在子进程输出上，
//! 通过有界队列把行交给编排线程；编排线程逐行落盘日志、解析进度
//! 标记并检查取消。dll-not-found 退出码触发一次备用求解器重试。
//!
//! # 模块结构
//!
//! - [`driver`]: [`SolverDriver`] 子进程生命周期管理
//! - [`progress`]: 进度标记解析

#![warn(missing_docs)]

pub mod driver;
pub mod error;
pub mod progress;

pub use driver::{ExitClass, SolveRequest, SolverDriver};
pub use error::{SolverError, SolverResult};
pub use progress::{ProgressParser, SolverProgress};
