//! commitgen - CLI entry point.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use commitgen::{
    DEFAULT_COUNT, DEFAULT_MODEL, GenerationRequest, generate_commit_messages, staged_diff,
};

/// Propose Conventional Commit messages for the staged changes.
#[derive(Parser, Debug)]
#[command(name = "commitgen")]
#[command(about = "Propose Conventional Commit messages for the staged changes")]
#[command(version)]
struct Cli {
    /// Number of candidates to generate
    #[arg(short = 'n', long, default_value_t = DEFAULT_COUNT)]
    count: usize,

    /// OpenAI model (also selects the tokenizer)
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Directory inside the repository to read staged changes from
    #[arg(long, default_value = ".")]
    cwd: PathBuf,

    /// OpenAI API key (defaults to OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Stop waiting for indexing and generation after this many seconds
    #[arg(long, value_name = "SECS")]
    deadline: Option<u64>,

    /// Print candidates as JSON
    #[arg(long)]
    json: bool,

    /// Print the staged diff and exit without calling the model
    #[arg(long)]
    print_diff: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .ok();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.print_diff {
        let diff = staged_diff(&cli.cwd)
            .await
            .context("Failed to read staged changes")?;
        print!("{}", diff);
        return Ok(());
    }

    let request = GenerationRequest {
        desired_count: cli.count,
        working_directory: cli.cwd,
        model: cli.model,
        credential: cli.api_key,
        deadline: cli.deadline.map(Duration::from_secs),
    };

    let messages = generate_commit_messages(&request)
        .await
        .context("Failed to generate commit messages")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&messages)
            .context("Failed to serialize commit messages")?;
        println!("{}", json);
    } else {
        for message in &messages {
            println!("{}", message.format());
        }
    }

    Ok(())
}
