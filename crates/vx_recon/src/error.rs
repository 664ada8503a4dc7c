// crates/vx_recon/src/error.rs

//! 集合重建错误类型

use thiserror::Error;
use vx_doc::DocError;
use vx_foundation::VxError;
use vx_mesh::MeshError;

/// 重建模块结果类型
pub type ReconResult<T> = Result<T, ReconError>;

/// 重建错误枚举
#[derive(Debug, Error)]
pub enum ReconError {
    /// 模板中非空的集合在新网格上重建为空
    #[error("命名集合丢失: {name}")]
    SelectionLost {
        /// 丢失的集合名
        name: String,
    },

    /// 同部件接触对使用了邻近规则（违反自接触策略）
    #[error("自接触策略违例: 接触对 '{pair}' 的面 '{surface}' 未使用相对边界规则")]
    SamePartPolicyViolation {
        /// 接触对名
        pair: String,
        /// 违例的面名
        surface: String,
    },

    /// 网格错误
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// 文档错误
    #[error(transparent)]
    Doc(#[from] DocError),

    /// 基础错误
    #[error(transparent)]
    Foundation(#[from] VxError),
}

impl ReconError {
    /// 创建集合丢失错误
    pub fn selection_lost(name: impl Into<String>) -> Self {
        Self::SelectionLost { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReconError::selection_lost("RUBBER_BOTTOM_CONTACT_Secondary");
        assert!(err.to_string().contains("RUBBER_BOTTOM_CONTACT_Secondary"));
    }
}
