// crates/vx_foundation/src/error.rs

//! 基础错误类型
//!
//! 定义工作区的基础错误，仅包含 IO、输入校验、取消等基础设施级别的
//! 错误。高层错误（网格、文档、求解器）各自定义错误枚举，最终在
//! 工作流层聚合。
//!
//! # 错误分层
//!
//! ```text
//! 工作流错误 (vx_workflow::PipelineError)
//!        ↑ (#[from])
//! 领域错误 (vx_mesh, vx_doc, vx_recon, vx_solver, vx_results)
//!        ↑ (#[from])
//! 基础错误 ← 你在这里 (vx_foundation::VxError)
//! ```

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型别名
pub type VxResult<T> = Result<T, VxError>;

/// 基础错误
///
/// 高层 crate 通过 `#[from]` 聚合本类型；取消是一种错误，
/// 以便在任意深度的调用栈中用 `?` 直接退出。
#[derive(Debug, Error)]
pub enum VxError {
    /// IO 操作失败
    #[error("IO 错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        /// 底层 IO 错误源
        #[source]
        source: Option<io::Error>,
    },

    /// 文件不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 未找到的文件路径
        path: PathBuf,
    },

    /// 输入数据验证失败
    #[error("无效输入: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 内部实现错误（不变量被破坏）
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },

    /// 资源未找到（注册表、名称查找等）
    #[error("未找到: {resource}")]
    NotFound {
        /// 资源名称或标识
        resource: String,
    },

    /// 操作被用户取消
    #[error("操作已取消")]
    Cancelled,
}

impl VxError {
    /// 创建 IO 错误
    #[inline]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带源的 IO 错误
    #[inline]
    pub fn io_with_source(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 创建文件未找到错误
    #[inline]
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// 创建无效输入错误
    #[inline]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 创建内部错误
    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 创建未找到错误
    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// 是否为取消
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<io::Error> for VxError {
    fn from(e: io::Error) -> Self {
        Self::Io {
            message: e.to_string(),
            source: Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VxError::invalid_input("empty part name");
        assert!(err.to_string().contains("empty part name"));

        let err = VxError::file_not_found("temp/missing.vtk");
        assert!(err.to_string().contains("missing.vtk"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: VxError = io_err.into();
        assert!(matches!(err, VxError::Io { source: Some(_), .. }));
    }

    #[test]
    fn test_is_cancelled() {
        assert!(VxError::Cancelled.is_cancelled());
        assert!(!VxError::internal("x").is_cancelled());
    }
}
