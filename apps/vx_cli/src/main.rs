// apps/vx_cli/src/main.rs

//! VEXIS-CAE 命令行界面
//!
//! 橡胶圆顶屈曲分析的自动化管线：网格置换、集合重建、求解
//! 驱动与结果提取。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// VEXIS-CAE 自动分析工作流
#[derive(Parser)]
#[command(name = "vx_cli")]
#[command(author = "VEXIS-CAE Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "VEXIS-CAE rubber dome analysis workflow", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行批处理分析
    Run(commands::run::RunArgs),
    /// 只做网格置换，产出准备好的输入文档
    Prepare(commands::prepare::PrepareArgs),
    /// 从求解器日志提取力-行程结果
    Extract(commands::extract::ExtractArgs),
    /// 显示网格或模板信息
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Prepare(args) => commands::prepare::execute(args),
        Commands::Extract(args) => commands::extract::execute(args),
        Commands::Info(args) => commands::info::execute(args),
    }
}
