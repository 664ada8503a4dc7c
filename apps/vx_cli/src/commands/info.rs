// apps/vx_cli/src/commands/info.rs

//! 信息命令
//!
//! 打印网格文件或模板文档的概要：节点/单元数、部件、包围盒、
//! 命名集合与接触对。

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use vx_config::AnalysisConfig;
use vx_doc::FebDocument;
use vx_mesh::geometry::mesh_bbox;
use vx_workflow::Pipeline;

/// 信息参数
#[derive(Args)]
pub struct InfoArgs {
    /// 网格文件
    #[arg(short, long)]
    pub mesh: Option<PathBuf>,

    /// 模板文档
    #[arg(short, long)]
    pub template: Option<PathBuf>,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    if args.mesh.is_none() && args.template.is_none() {
        anyhow::bail!("指定 --mesh 或 --template 之一");
    }

    if let Some(path) = &args.mesh {
        let pipeline = Pipeline::new(AnalysisConfig::default());
        let mesh = pipeline
            .load_mesh(path)
            .with_context(|| format!("加载网格失败: {}", path.display()))?;
        let bbox = mesh_bbox(&mesh);

        println!("网格: {}", path.display());
        println!("  节点: {}", mesh.n_nodes());
        println!("  单元: {}", mesh.n_elements());
        println!(
            "  包围盒: [{:.4}, {:.4}, {:.4}] - [{:.4}, {:.4}, {:.4}]",
            bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z
        );
        for part in mesh.parts() {
            println!("  部件 '{}': {} 单元", part.name, part.range.len());
        }
    }

    if let Some(path) = &args.template {
        let doc = FebDocument::load(path)
            .with_context(|| format!("加载模板失败: {}", path.display()))?;

        println!("模板: {}", path.display());
        println!("  部件: {:?}", doc.parts()?);
        println!("  节点集合: {}", doc.nodesets()?.len());
        println!("  面: {}", doc.surfaces()?.len());
        println!("  单元集合: {}", doc.elementsets()?.len());
        println!("  总模拟时长: {}", doc.control_total_time());
        for pair in doc.contact_pairs()? {
            println!("  接触对 '{}': {} / {}", pair.name, pair.primary, pair.secondary);
        }
    }

    Ok(())
}
