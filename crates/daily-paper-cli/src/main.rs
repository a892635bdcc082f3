use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use daily_paper_core::Config;

mod commands;

#[derive(Parser)]
#[command(name = "daily-paper")]
#[command(author, version, about = "Summarize academic papers in Chinese with an LLM")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize papers from a JSON file
    Summarize {
        /// JSON array of papers
        #[arg(short = 'i', long)]
        input: PathBuf,
        /// Write results here instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
        /// Keep going when a paper fails and emit only the successes
        #[arg(long)]
        keep_going: bool,
    },
    /// Validate the configuration file and print the resolved settings
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for JSON output
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let config = Config::parse(&config_path)?;

    match cli.command {
        Commands::Summarize {
            input,
            output,
            keep_going,
        } => commands::summarize::run(&config, &input, output.as_deref(), keep_going).await,
        Commands::CheckConfig => commands::check_config::run(&config, &config_path),
    }
}
