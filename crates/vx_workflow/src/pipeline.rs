// crates/vx_workflow/src/pipeline.rs

//! 单任务管线
//!
//! 阶段严格顺序：加载网格 → 对齐 → 模板分析 → 集合重建 →
//! 文档重写 → 参数覆盖 → 求解 → 结果提取。除求解器读线程外
//! 全部运行在编排线程上。准备好的文档经 `.tmp` 原子落盘；
//! 取消时不晋升任何结果产物。

use glam::DVec3;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use vx_config::{AnalysisConfig, ConfigError};
use vx_doc::overrides;
use vx_doc::{DocError, FebDocument, Rewriter};
use vx_foundation::CancelToken;
use vx_mesh::align::Aligner;
use vx_mesh::geometry::part_bbox;
use vx_mesh::io::{build_mesh, LegacyVtkLoader};
use vx_mesh::Mesh;
use vx_recon::{ReconstructionReport, SetReconstructor};
use vx_results::{extract_force_stroke, plot_force_stroke, write_csv};
use vx_solver::{SolveRequest, SolverDriver};

use crate::error::PipelineResult;
use crate::events::{EventDispatcher, LoggingListener, PipelineEvent, Stage};
use crate::job::{Job, JobId};

/// 一个任务的全部文件路径
#[derive(Debug, Clone)]
pub struct JobPaths {
    /// 准备好的输入文档
    pub prepared: PathBuf,
    /// 统一求解日志
    pub log: PathBuf,
    /// 力-行程 CSV
    pub csv: PathBuf,
    /// 力-行程曲线图
    pub plot: PathBuf,
    /// 失败记录
    pub err: PathBuf,
}

impl JobPaths {
    /// 按任务名派生路径
    pub fn for_job(config: &AnalysisConfig, name: &str) -> Self {
        Self {
            prepared: config.temp_dir.join(format!("{}.feb", name)),
            log: config.temp_dir.join(format!("{}.log", name)),
            csv: config.results_dir.join(format!("{}.csv", name)),
            plot: config.results_dir.join(format!("{}.png", name)),
            err: config.results_dir.join(format!("{}.err", name)),
        }
    }
}

/// 内存中准备完成的任务
#[derive(Debug)]
pub struct PreparedJob {
    /// 准备好的文档（尚未落盘）
    pub doc: FebDocument,
    /// 对齐后的新网格
    pub mesh: Mesh,
    /// 重建报告
    pub report: ReconstructionReport,
    /// 对齐平移量
    pub translation: DVec3,
    /// 总模拟时长（覆盖后）
    pub total_time: f64,
}

/// 分析管线
pub struct Pipeline {
    config: AnalysisConfig,
    events: Arc<EventDispatcher>,
}

impl Pipeline {
    /// 创建管线（自带日志监听器）
    pub fn new(config: AnalysisConfig) -> Self {
        let events = Arc::new(EventDispatcher::new());
        events.add_listener(Arc::new(LoggingListener));
        Self { config, events }
    }

    /// 替换事件分发器
    pub fn with_events(mut self, events: Arc<EventDispatcher>) -> Self {
        self.events = events;
        self
    }

    /// 配置
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// 事件分发器
    pub fn events(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    /// 加载网格文件并解析部件名
    pub fn load_mesh(&self, path: &std::path::Path) -> PipelineResult<Mesh> {
        let grid = LegacyVtkLoader::load(path)?;
        let mesh = build_mesh(grid, |id| {
            self.config.part_name_for_id(id).map(str::to_string)
        })?;
        Ok(mesh)
    }

    /// 内存管线：对齐、分析、重建、重写与参数覆盖
    ///
    /// 不做任何文件 IO，圆整测试与批处理共用。
    pub fn prepare(
        &self,
        template: &FebDocument,
        mut mesh: Mesh,
        job_id: JobId,
        cancel: &CancelToken,
    ) -> PipelineResult<PreparedJob> {
        let part = &self.config.reference_part_name;
        let tol = self.config.tolerance();

        self.emit_stage(job_id, Stage::Align);
        let old_min = old_part_min(template, part)?;
        let translation = Aligner::new(part.clone()).align(old_min, &mut mesh)?;

        self.emit_stage(job_id, Stage::Analyze);
        let reconstructor = SetReconstructor::analyze(template, part, tol)?;

        self.emit_stage(job_id, Stage::Reconstruct);
        let report = reconstructor.reconstruct(&mesh, cancel)?;

        self.emit_stage(job_id, Stage::Rewrite);
        let mut doc = template.clone();
        Rewriter::new().apply(&mut doc, &mesh, &report.update)?;

        // 参数覆盖：压头高度跟随新网格顶面，行程与步数按配置
        let rubber_max_z = part_bbox(&mesh, part)?.max.z;
        overrides::adjust_indenter_height(
            &mut doc,
            &self.config.indenter_part_name,
            rubber_max_z,
            self.config.indenter_ref_z,
        )?;
        if let Some(stroke) = self.config.total_stroke {
            overrides::override_push_distance(&mut doc, stroke);
        }
        if let Some(steps) = self.config.time_steps {
            overrides::override_time_steps(&mut doc, steps);
        }

        let total_time = doc.control_total_time();

        Ok(PreparedJob {
            doc,
            mesh,
            report,
            translation,
            total_time,
        })
    }

    /// 运行一个完整任务
    ///
    /// `prepare_only` 为真时在写出准备文档后停止（不求解）。
    pub fn run_job(
        &self,
        job: &mut Job,
        prepare_only: bool,
        cancel: &CancelToken,
    ) -> PipelineResult<()> {
        job.mark_started();
        let paths = JobPaths::for_job(&self.config, &job.name);

        let result = self.execute(job, &paths, prepare_only, cancel);
        match &result {
            Ok(()) => {
                job.mark_completed();
                self.events.emit(PipelineEvent::JobCompleted {
                    job_id: job.id,
                    duration_secs: job
                        .elapsed()
                        .map(|d| d.num_milliseconds() as f64 / 1000.0)
                        .unwrap_or(0.0),
                });
            }
            Err(e) if e.is_cancelled() => {
                job.mark_cancelled();
                self.cleanup_cancelled(&paths);
                self.events.emit(PipelineEvent::JobCancelled { job_id: job.id });
            }
            Err(e) => {
                job.mark_failed(format!("{}: {}", e.kind(), e));
                if let Err(write_err) =
                    std::fs::write(&paths.err, format!("{}: {}\n", e.kind(), e))
                {
                    warn!("Cannot write {}: {}", paths.err.display(), write_err);
                }
                self.events.emit(PipelineEvent::JobFailed {
                    job_id: job.id,
                    kind: e.kind(),
                    error: e.to_string(),
                });
            }
        }
        result
    }

    fn execute(
        &self,
        job: &Job,
        paths: &JobPaths,
        prepare_only: bool,
        cancel: &CancelToken,
    ) -> PipelineResult<()> {
        std::fs::create_dir_all(&self.config.temp_dir)
            .map_err(vx_foundation::VxError::from)?;
        std::fs::create_dir_all(&self.config.results_dir)
            .map_err(vx_foundation::VxError::from)?;

        cancel.check()?;

        self.emit_stage(job.id, Stage::LoadMesh);
        let mesh = self.load_mesh(&job.mesh_path)?;
        let template = FebDocument::load(&self.config.template_path)?;

        let prepared = self.prepare(&template, mesh, job.id, cancel)?;
        Rewriter::new().save_atomic(&prepared.doc, &paths.prepared)?;

        if prepare_only {
            info!("Prepare-only: stopping after {}", paths.prepared.display());
            return Ok(());
        }

        let Some(primary) = &self.config.febio_path else {
            return Err(ConfigError::Missing("febio_path".to_string()).into());
        };

        self.emit_stage(job.id, Stage::Solve);
        let driver = SolverDriver::new(
            primary.clone(),
            self.config.febio_fallback_path.clone(),
            Duration::from_secs_f64(self.config.grace_timeout_secs),
        );
        let request = SolveRequest {
            input: paths.prepared.clone(),
            work_dir: self.config.temp_dir.clone(),
            log_path: paths.log.clone(),
            total_time: prepared.total_time,
        };
        let events = self.events.clone();
        let job_id = job.id;
        driver.run(
            &request,
            &move |p| {
                events.emit(PipelineEvent::SolverProgress {
                    job_id,
                    fraction: p.fraction,
                    current_time: p.current_time,
                });
            },
            cancel,
        )?;

        self.emit_stage(job.id, Stage::Extract);
        let points = extract_force_stroke(&paths.log)?;
        write_csv(&points, &paths.csv)?;
        if points.is_empty() {
            // 非致命：空 CSV 落盘，跳过绘图
            warn!("No rigid body rows for job '{}', plot skipped", job.name);
            return Ok(());
        }
        if let Err(e) = plot_force_stroke(&points, &job.name, &paths.plot) {
            // 绘图后端缺失不拖垮任务，CSV 是正式产物
            warn!("Plot failed for job '{}': {}", job.name, e);
        }

        Ok(())
    }

    fn cleanup_cancelled(&self, paths: &JobPaths) {
        let tmp = paths.prepared.with_extension("feb.tmp");
        if tmp.exists() {
            let _ = std::fs::remove_file(&tmp);
        }
        for artefact in [&paths.csv, &paths.plot] {
            if artefact.exists() {
                let _ = std::fs::remove_file(artefact);
            }
        }
    }

    fn emit_stage(&self, job_id: JobId, stage: Stage) {
        self.events.emit(PipelineEvent::StageStarted { job_id, stage });
    }
}

/// 模板中参考部件的最小角
fn old_part_min(template: &FebDocument, part: &str) -> PipelineResult<DVec3> {
    let coords = template.node_coords()?;
    let ids = template.part_node_ids(part)?;
    let mut min = DVec3::splat(f64::MAX);
    let mut any = false;
    for id in &ids {
        if let Some(p) = coords.get(id) {
            min = min.min(*p);
            any = true;
        }
    }
    if !any {
        return Err(DocError::template_missing_part(part).into());
    }
    Ok(min)
}
