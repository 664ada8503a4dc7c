// apps/vx_cli/src/commands/run.rs

//! 运行批处理命令
//!
//! 扫描输入目录下的网格文件并逐个执行完整管线。
//! 进程退出码：0 全部成功；1 至少一个失败；2 没有输入。

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use vx_config::AnalysisConfig;
use vx_foundation::CancelToken;
use vx_workflow::{BatchRunner, Pipeline};

/// 批处理参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径（JSON；缺省时用内置默认值）
    #[arg(short, long, default_value = "config/config.json")]
    pub config: PathBuf,

    /// 只做置换，不求解
    #[arg(long)]
    pub prepare_only: bool,
}

/// 执行批处理
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== VEXIS-CAE 批处理启动 ===");

    let config = if args.config.exists() {
        AnalysisConfig::from_file(&args.config)
            .with_context(|| format!("加载配置失败: {}", args.config.display()))?
    } else {
        info!("配置文件 {} 不存在，使用默认配置", args.config.display());
        AnalysisConfig::default()
    };

    info!(
        "模板: {} | 输入: {} | 结果: {}",
        config.template_path.display(),
        config.input_dir.display(),
        config.results_dir.display()
    );

    let runner = BatchRunner::new(Pipeline::new(config));
    let outcome = runner.run(args.prepare_only, &CancelToken::new())?;

    info!(
        "=== 批处理结束: {}/{} 完成, {} 失败 ===",
        outcome.completed, outcome.total, outcome.failed
    );
    std::process::exit(outcome.exit_code());
}
