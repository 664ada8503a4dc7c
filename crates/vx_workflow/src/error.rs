// crates/vx_workflow/src/error.rs

//! 工作流错误类型
//!
//! 聚合各层错误并给出稳定的错误种类名：批处理用它命名 `.err`
//! 文件，区分致命与可降级的失败。

use thiserror::Error;
use vx_config::ConfigError;
use vx_doc::DocError;
use vx_foundation::VxError;
use vx_mesh::MeshError;
use vx_recon::ReconError;
use vx_results::ResultsError;
use vx_solver::SolverError;

/// 工作流结果类型
pub type PipelineResult<T> = Result<T, PipelineError>;

/// 工作流错误枚举
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 网格错误
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// 文档错误
    #[error(transparent)]
    Doc(#[from] DocError),

    /// 集合重建错误
    #[error(transparent)]
    Recon(#[from] ReconError),

    /// 求解器错误
    #[error(transparent)]
    Solver(#[from] SolverError),

    /// 结果提取错误
    #[error(transparent)]
    Results(#[from] ResultsError),

    /// 基础错误（含取消）
    #[error(transparent)]
    Foundation(#[from] VxError),
}

impl PipelineError {
    /// 稳定的错误种类名（`.err` 文件与日志用）
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "ConfigError",
            Self::Mesh(MeshError::MalformedMesh { .. }) => "MalformedMesh",
            Self::Mesh(MeshError::MissingPart { .. }) => "MissingPart",
            Self::Mesh(_) => "MeshError",
            Self::Doc(DocError::TemplateMissingPart { .. }) => "TemplateMissingPart",
            Self::Doc(DocError::SelectionLost { .. }) => "SelectionLost",
            Self::Doc(_) => "DocError",
            Self::Recon(ReconError::SelectionLost { .. }) => "SelectionLost",
            Self::Recon(ReconError::SamePartPolicyViolation { .. }) => "SamePartPolicyViolation",
            Self::Recon(ReconError::Mesh(MeshError::MissingPart { .. })) => "MissingPart",
            Self::Recon(_) => "ReconError",
            Self::Solver(SolverError::Failed { .. }) => "SolverFailed",
            Self::Solver(SolverError::MissingRuntime) => "SolverMissingRuntime",
            Self::Solver(_) => "SolverError",
            Self::Results(_) => "ResultsError",
            Self::Foundation(VxError::Cancelled) => "Cancelled",
            Self::Foundation(_) => "IoError",
        }
    }

    /// 是否为取消
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Foundation(e) => e.is_cancelled(),
            Self::Mesh(MeshError::Foundation(e)) => e.is_cancelled(),
            Self::Doc(DocError::Foundation(e)) => e.is_cancelled(),
            Self::Recon(ReconError::Foundation(e)) => e.is_cancelled(),
            Self::Solver(SolverError::Foundation(e)) => e.is_cancelled(),
            Self::Results(ResultsError::Foundation(e)) => e.is_cancelled(),
            _ => false,
        }
    }
}
