// crates/vx_workflow/src/lib.rs

//! VEXIS-CAE 工作流层
//!
//! 单编排线程按固定阶段顺序执行一个任务：加载网格 → 对齐 →
//! 模板分析 → 集合重建 → 文档重写 → 参数覆盖 → 求解 → 结果提取。
//! 批处理严格顺序执行各任务，单个任务失败不中止批次，临时目录
//! 按任务隔离。
//!
//! # 模块结构
//!
//! - [`job`]: 任务定义与状态
//! - [`events`]: 管线事件与分发
//! - [`pipeline`]: 单任务管线
//! - [`batch`]: 批处理运行器

#![warn(missing_docs)]

pub mod batch;
pub mod error;
pub mod events;
pub mod job;
pub mod pipeline;

pub use batch::{BatchOutcome, BatchRunner};
pub use error::{PipelineError, PipelineResult};
pub use events::{EventDispatcher, EventListener, PipelineEvent, Stage};
pub use job::{Job, JobId, JobStatus};
pub use pipeline::{JobPaths, Pipeline, PreparedJob};
