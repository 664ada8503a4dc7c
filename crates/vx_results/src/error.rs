// crates/vx_results/src/error.rs

//! 结果提取错误类型

use thiserror::Error;
use vx_foundation::VxError;

/// 结果模块结果类型
pub type ResultsResult<T> = Result<T, ResultsError>;

/// 结果提取错误枚举
///
/// 日志中没有刚体行不是错误：提取返回空序列，由上层降级为警告。
#[derive(Debug, Error)]
pub enum ResultsError {
    /// 绘图失败
    #[error("绘图失败: {message}")]
    Plot {
        /// 失败原因
        message: String,
    },

    /// 基础错误
    #[error(transparent)]
    Foundation(#[from] VxError),
}

impl From<std::io::Error> for ResultsError {
    fn from(e: std::io::Error) -> Self {
        Self::Foundation(e.into())
    }
}
