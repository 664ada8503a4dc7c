// apps/vx_cli/src/commands/extract.rs

//! 结果提取命令
//!
//! 从已有的求解器日志提取力-行程序列，写 CSV 并绘图。

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

use vx_results::{extract_force_stroke, plot_force_stroke, write_csv};

/// 提取参数
#[derive(Args)]
pub struct ExtractArgs {
    /// 求解器日志
    #[arg(short, long)]
    pub log: PathBuf,

    /// 输出目录
    #[arg(short, long, default_value = "results")]
    pub out_dir: PathBuf,
}

/// 执行提取
pub fn execute(args: ExtractArgs) -> Result<()> {
    std::fs::create_dir_all(&args.out_dir)?;

    let stem = args
        .log
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "result".to_string());
    let csv_path = args.out_dir.join(format!("{}.csv", stem));
    let png_path = args.out_dir.join(format!("{}.png", stem));

    let points = extract_force_stroke(&args.log)
        .with_context(|| format!("解析日志失败: {}", args.log.display()))?;
    write_csv(&points, &csv_path)?;

    if points.is_empty() {
        warn!("日志中没有刚体时程行，跳过绘图");
        return Ok(());
    }

    plot_force_stroke(&points, &stem, &png_path)?;
    info!("完成: {} ({} 点)", csv_path.display(), points.len());
    Ok(())
}
