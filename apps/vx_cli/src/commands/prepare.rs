// apps/vx_cli/src/commands/prepare.rs

//! 单文件置换命令
//!
//! 对一个网格文件执行置换与集合重建，写出准备好的输入文档，
//! 不调用求解器。

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use vx_config::AnalysisConfig;
use vx_doc::{FebDocument, Rewriter};
use vx_foundation::CancelToken;
use vx_workflow::{JobId, Pipeline};

/// 置换参数
#[derive(Args)]
pub struct PrepareArgs {
    /// 网格文件
    #[arg(short, long)]
    pub mesh: PathBuf,

    /// 模板文档
    #[arg(short, long, default_value = "template.feb")]
    pub template: PathBuf,

    /// 输出路径（缺省为网格名 + .feb）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// 执行置换
pub fn execute(args: PrepareArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("加载配置失败: {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    config.template_path = args.template.clone();

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.mesh.with_extension("feb"));

    let pipeline = Pipeline::new(config);
    let template = FebDocument::load(&args.template)
        .with_context(|| format!("加载模板失败: {}", args.template.display()))?;
    let mesh = pipeline.load_mesh(&args.mesh)?;

    info!(
        "置换: {} 节点, {} 单元 -> {}",
        mesh.n_nodes(),
        mesh.n_elements(),
        output.display()
    );

    let prepared = pipeline.prepare(&template, mesh, JobId::new(), &CancelToken::new())?;
    Rewriter::new().save_atomic(&prepared.doc, &output)?;

    for (name, rule) in &prepared.report.rules_used {
        info!("  {} <- {}", name, rule);
    }
    info!("完成: {}", output.display());
    Ok(())
}
