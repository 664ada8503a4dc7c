// crates/vx_workflow/src/batch.rs

//! 批处理运行器
//!
//! 扫描输入目录下的网格文件并逐个顺序运行。单个任务失败写
//! `.err` 后继续下一个，批次绝不因单个失败中止；取消停止整批。
//!
//! 退出码：0 全部成功；1 至少一个失败；2 没有输入。

use std::path::PathBuf;
use tracing::info;

use vx_foundation::CancelToken;

use crate::error::PipelineResult;
use crate::events::PipelineEvent;
use crate::job::Job;
use crate::pipeline::Pipeline;

/// 批处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// 发现的输入数
    pub total: usize,
    /// 成功完成的任务数
    pub completed: usize,
    /// 失败的任务数
    pub failed: usize,
    /// 是否被取消
    pub cancelled: bool,
}

impl BatchOutcome {
    /// 批处理进程退出码
    pub fn exit_code(&self) -> i32 {
        if self.total == 0 {
            2
        } else if self.failed > 0 {
            1
        } else {
            0
        }
    }
}

/// 批处理运行器
pub struct BatchRunner {
    pipeline: Pipeline,
}

impl BatchRunner {
    /// 创建运行器
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// 管线
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// 扫描输入目录下的网格文件（按文件名排序）
    pub fn scan_inputs(&self) -> PipelineResult<Vec<PathBuf>> {
        let dir = &self.pipeline.config().input_dir;
        let mut inputs = Vec::new();
        if dir.is_dir() {
            for entry in std::fs::read_dir(dir).map_err(vx_foundation::VxError::from)? {
                let path = entry.map_err(vx_foundation::VxError::from)?.path();
                if path.extension().is_some_and(|e| e == "vtk") {
                    inputs.push(path);
                }
            }
        }
        inputs.sort();
        Ok(inputs)
    }

    /// 运行整个批次
    pub fn run(&self, prepare_only: bool, cancel: &CancelToken) -> PipelineResult<BatchOutcome> {
        let inputs = self.scan_inputs()?;
        let mut outcome = BatchOutcome {
            total: inputs.len(),
            completed: 0,
            failed: 0,
            cancelled: false,
        };

        if inputs.is_empty() {
            info!(
                "No mesh inputs in {}",
                self.pipeline.config().input_dir.display()
            );
            return Ok(outcome);
        }

        info!("Batch start: {} jobs", inputs.len());
        for input in inputs {
            if cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }

            let mut job = Job::from_mesh_path(&input);
            self.pipeline.events().emit(PipelineEvent::JobSubmitted {
                job_id: job.id,
                name: job.name.clone(),
            });

            match self.pipeline.run_job(&mut job, prepare_only, cancel) {
                Ok(()) => outcome.completed += 1,
                Err(e) if e.is_cancelled() => {
                    outcome.cancelled = true;
                    break;
                }
                Err(_) => outcome.failed += 1,
            }
        }

        info!(
            "Batch done: {}/{} completed, {} failed",
            outcome.completed, outcome.total, outcome.failed
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let empty = BatchOutcome {
            total: 0,
            completed: 0,
            failed: 0,
            cancelled: false,
        };
        assert_eq!(empty.exit_code(), 2);

        let ok = BatchOutcome {
            total: 2,
            completed: 2,
            failed: 0,
            cancelled: false,
        };
        assert_eq!(ok.exit_code(), 0);

        let partial = BatchOutcome {
            total: 2,
            completed: 1,
            failed: 1,
            cancelled: false,
        };
        assert_eq!(partial.exit_code(), 1);
    }
}
