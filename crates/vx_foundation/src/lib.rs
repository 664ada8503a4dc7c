// crates/vx_foundation/src/lib.rs

//! VEXIS-CAE 基础层
//!
//! 提供整个工作区共享的基础设施，不含任何网格或文档领域概念。
//!
//! # 模块概览
//!
//! - [`error`]: 基础错误类型 [`VxError`] / [`VxResult`]
//! - [`tolerance`]: 几何比较容差模型 [`Tolerance`]
//! - [`cancel`]: 协作式取消令牌 [`CancelToken`]
//!
//! # 设计原则
//!
//! 1. **零领域依赖**：本层禁止引入网格、XML 文档、求解器等高层概念
//! 2. **参数注入**：容差与取消令牌都通过参数传递，无全局可变状态

#![warn(missing_docs)]

pub mod cancel;
pub mod error;
pub mod tolerance;

pub use cancel::CancelToken;
pub use error::{VxError, VxResult};
pub use tolerance::Tolerance;
