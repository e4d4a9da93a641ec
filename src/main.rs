mod ai;
mod cli;
mod config;
mod dingtalk;
mod error;
mod gitlab;
mod orchestrator;
mod prompt;

use clap::Parser;
use cli::Cli;
use config::Config;
use orchestrator::Orchestrator;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "daily_recap=warn",
        1 => "daily_recap=info",
        _ => "daily_recap=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    println!("🚀 开始执行自动化日报任务...\n");

    if let Err(e) = run(&cli).await {
        eprintln!("\n任务执行失败: {}", e);
        eprintln!("请检查配置和网络连接\n");
        std::process::exit(1);
    }

    println!("🎉 任务执行完成!\n");
}

async fn run(cli: &Cli) -> error::Result<()> {
    let config = Config::from_env()?;
    let orchestrator = Orchestrator::new(config)?;
    orchestrator.run(cli.report_date(), cli.dry_run).await
}
