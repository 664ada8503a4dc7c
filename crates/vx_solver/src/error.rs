// crates/vx_solver/src/error.rs

//! 求解器驱动错误类型

use std::path::PathBuf;
use thiserror::Error;
use vx_foundation::VxError;

/// 求解器模块结果类型
pub type SolverResult<T> = Result<T, SolverError>;

/// 求解器错误枚举
#[derive(Debug, Error)]
pub enum SolverError {
    /// 无法启动求解器进程
    #[error("无法启动求解器 {exe}: {message}")]
    Spawn {
        /// 可执行文件路径
        exe: PathBuf,
        /// 失败原因
        message: String,
    },

    /// 求解器以非零退出码结束
    #[error("求解器失败: 退出码 {code}")]
    Failed {
        /// 退出码（被信号终止时为 -1）
        code: i32,
    },

    /// 主求解器与备用求解器都缺少运行时依赖
    #[error("求解器运行时缺失 (dll-not-found)")]
    MissingRuntime,

    /// 基础错误（含取消）
    #[error(transparent)]
    Foundation(#[from] VxError),
}

impl From<std::io::Error> for SolverError {
    fn from(e: std::io::Error) -> Self {
        Self::Foundation(e.into())
    }
}
