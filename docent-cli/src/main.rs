//! Docent CLI — ask questions over a local directory of documents.
//!
//! Indexes the document directory on startup, answers one question against
//! the local inference server, and prints the answer (with sources on
//! request).

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Docent: question answering over your documents, locally
#[derive(Parser, Debug)]
#[command(name = "docent", version, about, long_about = None)]
struct Cli {
    /// Question to answer over the indexed documents
    question: Option<String>,

    /// Directory of documents to index
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Generative model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Embedding provider: ollama, hash
    #[arg(short, long)]
    embedder: Option<String>,

    /// Number of chunks to retrieve as context
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Print the source chunks behind the answer
    #[arg(short, long)]
    sources: bool,

    /// Emit the full answer (text, sources, stats) as JSON
    #[arg(long)]
    json: bool,

    /// Workspace directory (where .docent/config.toml is looked up)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Build the index and report corpus statistics without querying
    Index,
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create default configuration file
    Init,
    /// Show current configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "docent", "docent")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "docent.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // Resolve workspace
    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    // Load configuration and apply CLI overrides before anything consumes it,
    // subcommands included.
    let mut config = docent_core::config::load_config(Some(&workspace), None)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    if let Some(data_dir) = cli.data_dir {
        config.documents.data_dir = data_dir;
    }
    if let Some(model) = cli.model {
        config.llm.model = model;
    }
    if let Some(embedder) = cli.embedder {
        config.embedding.provider = embedder;
    }
    if let Some(top_k) = cli.top_k {
        config.retrieval.top_k = top_k;
    }
    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }

    // Handle subcommands
    if let Some(command) = cli.command {
        return commands::handle_command(command, &workspace, config).await;
    }

    let Some(question) = cli.question else {
        anyhow::bail!("no question given; run `docent --help` for usage");
    };

    let answer = commands::ask(config, &question).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
        return Ok(());
    }
    println!("{}", answer.text.trim());
    if cli.sources {
        commands::print_sources(&answer);
    }
    Ok(())
}
