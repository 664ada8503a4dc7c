// crates/vx_mesh/src/error.rs

//! 网格层错误类型

use thiserror::Error;
use vx_foundation::VxError;

/// 网格模块结果类型
pub type MeshResult<T> = Result<T, MeshError>;

/// 网格错误枚举
#[derive(Debug, Error)]
pub enum MeshError {
    /// 网格文件或内存结构不合法
    #[error("网格格式错误: {message}")]
    MalformedMesh {
        /// 说明哪里不合法
        message: String,
    },

    /// 部件缺失（网格文件的部件 id 无对应名称，或名称在网格中不存在）
    #[error("部件缺失: {name}")]
    MissingPart {
        /// 部件名或 id 描述
        name: String,
    },

    /// 拓扑操作失败
    #[error("拓扑错误: {operation} 失败, {details}")]
    InvalidTopology {
        /// 失败的操作
        operation: &'static str,
        /// 细节
        details: String,
    },

    /// 基础错误
    #[error(transparent)]
    Foundation(#[from] VxError),
}

impl MeshError {
    /// 创建格式错误
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedMesh {
            message: message.into(),
        }
    }

    /// 创建部件缺失错误
    pub fn missing_part(name: impl Into<String>) -> Self {
        Self::MissingPart { name: name.into() }
    }

    /// 创建拓扑错误
    pub fn invalid_topology(operation: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidTopology {
            operation,
            details: details.into(),
        }
    }
}

impl From<std::io::Error> for MeshError {
    fn from(e: std::io::Error) -> Self {
        Self::Foundation(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeshError::missing_part("RUBBER_OBJ");
        assert!(err.to_string().contains("RUBBER_OBJ"));

        let err = MeshError::malformed("unknown cell type 42");
        assert!(err.to_string().contains("42"));
    }
}
