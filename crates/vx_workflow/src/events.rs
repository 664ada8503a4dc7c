// crates/vx_workflow/src/events.rs

//! 管线事件
//!
//! 事件是发后不理的通知；合并与节流由 UI 侧负责，核心不做。

use parking_lot::RwLock;
use std::sync::Arc;

use crate::job::JobId;

/// 管线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// 加载网格
    LoadMesh,
    /// 对齐
    Align,
    /// 模板分析
    Analyze,
    /// 集合重建
    Reconstruct,
    /// 文档重写
    Rewrite,
    /// 求解
    Solve,
    /// 结果提取
    Extract,
}

impl Stage {
    /// 阶段名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadMesh => "LoadMesh",
            Self::Align => "Align",
            Self::Analyze => "Analyze",
            Self::Reconstruct => "Reconstruct",
            Self::Rewrite => "Rewrite",
            Self::Solve => "Solve",
            Self::Extract => "Extract",
        }
    }
}

/// 管线事件
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// 任务已提交
    JobSubmitted {
        /// 任务ID
        job_id: JobId,
        /// 任务名称
        name: String,
    },
    /// 阶段开始
    StageStarted {
        /// 任务ID
        job_id: JobId,
        /// 阶段
        stage: Stage,
    },
    /// 求解进度
    SolverProgress {
        /// 任务ID
        job_id: JobId,
        /// 进度分数 (0.0-1.0)
        fraction: f64,
        /// 当前模拟时间
        current_time: f64,
    },
    /// 任务已完成
    JobCompleted {
        /// 任务ID
        job_id: JobId,
        /// 运行时长 (秒)
        duration_secs: f64,
    },
    /// 任务失败
    JobFailed {
        /// 任务ID
        job_id: JobId,
        /// 错误种类
        kind: &'static str,
        /// 错误信息
        error: String,
    },
    /// 任务已取消
    JobCancelled {
        /// 任务ID
        job_id: JobId,
    },
}

impl PipelineEvent {
    /// 事件对应的任务ID
    pub fn job_id(&self) -> JobId {
        match self {
            Self::JobSubmitted { job_id, .. } => *job_id,
            Self::StageStarted { job_id, .. } => *job_id,
            Self::SolverProgress { job_id, .. } => *job_id,
            Self::JobCompleted { job_id, .. } => *job_id,
            Self::JobFailed { job_id, .. } => *job_id,
            Self::JobCancelled { job_id } => *job_id,
        }
    }
}

/// 事件监听器trait
pub trait EventListener: Send + Sync {
    /// 处理事件
    fn on_event(&self, event: &PipelineEvent);

    /// 监听器名称（调试用）
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// 函数式事件监听器
pub struct FnListener<F>
where
    F: Fn(&PipelineEvent) + Send + Sync,
{
    name: String,
    handler: F,
}

impl<F> FnListener<F>
where
    F: Fn(&PipelineEvent) + Send + Sync,
{
    /// 创建函数式监听器
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> EventListener for FnListener<F>
where
    F: Fn(&PipelineEvent) + Send + Sync,
{
    fn on_event(&self, event: &PipelineEvent) {
        (self.handler)(event);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 日志事件监听器
pub struct LoggingListener;

impl EventListener for LoggingListener {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::JobSubmitted { job_id, name } => {
                tracing::info!("Job '{}' (id={}) submitted", name, job_id);
            }
            PipelineEvent::StageStarted { job_id, stage } => {
                tracing::info!("Job {}: stage {}", job_id, stage.name());
            }
            PipelineEvent::SolverProgress {
                job_id,
                fraction,
                current_time,
            } => {
                tracing::debug!(
                    "Job {} progress: {:.1}% (t={:.3})",
                    job_id,
                    fraction * 100.0,
                    current_time
                );
            }
            PipelineEvent::JobCompleted {
                job_id,
                duration_secs,
            } => {
                tracing::info!("Job {} completed in {:.2}s", job_id, duration_secs);
            }
            PipelineEvent::JobFailed {
                job_id,
                kind,
                error,
            } => {
                tracing::error!("Job {} failed [{}]: {}", job_id, kind, error);
            }
            PipelineEvent::JobCancelled { job_id } => {
                tracing::info!("Job {} cancelled", job_id);
            }
        }
    }

    fn name(&self) -> &str {
        "LoggingListener"
    }
}

/// 事件分发器
#[derive(Default)]
pub struct EventDispatcher {
    listeners: RwLock<Vec<Arc<dyn EventListener>>>,
}

impl EventDispatcher {
    /// 创建新的事件分发器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加监听器
    pub fn add_listener(&self, listener: Arc<dyn EventListener>) {
        self.listeners.write().push(listener);
    }

    /// 添加函数式监听器
    pub fn add_fn_listener<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&PipelineEvent) + Send + Sync + 'static,
    {
        self.add_listener(Arc::new(FnListener::new(name, handler)));
    }

    /// 分发事件
    pub fn emit(&self, event: PipelineEvent) {
        for listener in self.listeners.read().iter() {
            listener.on_event(&event);
        }
    }

    /// 监听器数量
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_event_dispatcher() {
        let dispatcher = EventDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        dispatcher.add_fn_listener("test", move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        let job_id = JobId::new();
        dispatcher.emit(PipelineEvent::StageStarted {
            job_id,
            stage: Stage::LoadMesh,
        });
        dispatcher.emit(PipelineEvent::JobCompleted {
            job_id,
            duration_secs: 1.0,
        });

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_event_job_id() {
        let job_id = JobId::new();
        let event = PipelineEvent::SolverProgress {
            job_id,
            fraction: 0.5,
            current_time: 0.5,
        };
        assert_eq!(event.job_id(), job_id);
    }
}
