//! CodeFlow CLI entry point

use clap::{Parser, Subcommand};
use codeflow_core::{CodeflowConfig, FidelityMode, Language, CONFIG_FILE};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "codeflow")]
#[command(about = "Live structure and dependency graphs for source code", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to codeflow.toml in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the graph of a source file or of a parser's JSON output
    Ast {
        file: PathBuf,

        /// Language of the input; auto-detected for source files when omitted
        #[arg(short, long)]
        lang: Option<Language>,

        /// Fidelity: simple (conceptual) or advanced (full)
        #[arg(short, long)]
        mode: Option<FidelityMode>,

        /// Visitor-key table for JS-family parser output
        #[arg(long)]
        visitor_keys: Option<PathBuf>,
    },
    /// Print the file dependency graph of a project
    Deps { dir: PathBuf },
    /// Watch a project and print its dependency graph on every settled change
    Watch { dir: PathBuf },
    /// Print a generated README for a project
    Readme { dir: PathBuf },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries graph JSON
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("codeflow={}", log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let config = CodeflowConfig::load_with_env(&config_path)?;
    tracing::debug!("CodeFlow v{}, config {}", env!("CARGO_PKG_VERSION"), config_path.display());

    match cli.command {
        Commands::Ast {
            file,
            lang,
            mode,
            visitor_keys,
        } => commands::ast(&config, file, lang, mode, visitor_keys).await,
        Commands::Deps { dir } => commands::deps(&config, dir).await,
        Commands::Watch { dir } => commands::watch(&config, dir).await,
        Commands::Readme { dir } => commands::readme(&config, dir),
        Commands::Version => {
            println!("CodeFlow v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
