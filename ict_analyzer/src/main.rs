use std::process::ExitCode;

use clap::Parser;
use ict_analyzer::cli::{self, commands::Cli};
use shared_utils::logging::{LevelFilter, init_logging};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging(LevelFilter::INFO);
    let cli = Cli::parse();

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error during analysis: {err:#}");
            ExitCode::FAILURE
        }
    }
}
