//! Command-line front end: argument parsing, request building and output.

pub mod commands;
pub mod output;
pub mod params;

use anyhow::Context;
use chrono::Utc;
use market_data_ingestor::providers::coingecko_rest::CoinGeckoConfig;

use crate::{
    analysis::Analyzer,
    config::{AnalyzerConfig, load_config_path},
    providers::build_provider,
    render::{SvgChartRenderer, default_output_dir},
};
use commands::{AnalyzeArgs, Cli, Commands, OutputFormat};

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_path(path)?,
        None => AnalyzerConfig::default(),
    };

    match cli.command {
        Commands::Analyze(args) => analyze(args, &config).await,
        Commands::Symbols => {
            print!("{}", format_symbols(&config.coingecko));
            Ok(())
        }
    }
}

async fn analyze(args: AnalyzeArgs, config: &AnalyzerConfig) -> anyhow::Result<()> {
    let request = params::build_request(&args, config, Utc::now().date_naive())?;
    let kind = args.provider.unwrap_or(config.provider.kind);
    let provider = build_provider(kind, config).context("failed to set up data provider")?;
    let renderer = SvgChartRenderer::new(config.chart.width, config.chart.height);

    let report = Analyzer::new(provider, renderer).run_analysis(&request).await?;

    let dir = args
        .output_dir
        .or_else(|| config.chart.output_dir.clone())
        .unwrap_or_else(default_output_dir);
    let chart_path = report.chart.write_to_dir(&dir)?;

    match args.format {
        OutputFormat::Text => {
            let recent = args.recent.unwrap_or(config.analysis.recent);
            print!("{}", output::format_text(&report, recent, &chart_path));
        }
        OutputFormat::Json => println!("{}", output::format_json(&report, &chart_path)?),
    }
    Ok(())
}

fn format_symbols(config: &CoinGeckoConfig) -> String {
    config
        .symbols
        .iter()
        .map(|(symbol, id)| format!("{symbol:<14}{id}\n"))
        .collect()
}
