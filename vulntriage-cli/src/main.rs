//! vulntriage — 취약점 스캔 임포트 및 전문가 평가 CLI
//!
//! 스캔 내보내기 파일을 데이터셋으로 임포트하고, 레코드를 조회하고,
//! 전문가 평가를 기록합니다. 설정은 `vulntriage.toml`과
//! `VULNTRIAGE_*` 환경변수로 제어합니다.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use vulntriage_core::config::VulntriageConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = VulntriageConfig::load_or_default(&cli.config)
        .await
        .map_err(|e| CliError::Config(e.to_string()))?;

    logging::init_tracing(&config.general, cli.log_level.as_deref())
        .map_err(|e| CliError::Config(e.to_string()))?;

    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Ingest(args) => commands::ingest::execute(args, &config, &writer).await,
        Commands::Datasets => commands::datasets::execute(&config, &writer).await,
        Commands::Records(args) => commands::records::execute(args, &config, &writer).await,
        Commands::Assess(args) => commands::assess::execute(args, &config, &writer).await,
        Commands::Remove(args) => commands::remove::execute(args, &config, &writer).await,
        Commands::Config(args) => {
            commands::config::execute(args, &config, &cli.config, &writer).await
        }
    }
}
