//! jobmatch - job listing assistant on the command line.
//!
//! Replies go to stdout; logs go to stderr (`RUST_LOG` overrides `-v`).

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use jobmatch_core::config::{Config, Settings};
use jobmatch_core::ChatRequest;
use jobmatch_dialogue::{ChatService, Runtime, StartOptions};
use jobmatch_index::BuildSource;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "jobmatch", version, about = "Job listing assistant")]
struct Cli {
    /// Directory holding config.toml and config.<env>.toml
    #[arg(long, global = true, env = "JOBMATCH_CONFIG_DIR", default_value = ".")]
    config_dir: PathBuf,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive conversation on stdin
    Chat {
        #[arg(long, default_value = "default")]
        session: String,
    },
    /// Send one message and print the reply
    Ask {
        message: String,
        #[arg(long, default_value = "default")]
        session: String,
    },
    /// One JSON chat request per stdin line, one JSON reply per stdout line
    ServeJsonl,
    /// Rank job listings against a query
    Search {
        query: String,
        /// Overrides retrieval.threshold
        #[arg(long)]
        threshold: Option<f32>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Build (or reuse) the embedding cache and report
    Embed {
        /// Recompute even if the cache matches the corpus
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load_from(&cli.config_dir)
        .with_context(|| format!("loading configuration from {}", cli.config_dir.display()))?;
    let settings = config.settings()?;

    match cli.command {
        Command::Chat { session } => chat(&settings, &session).await,
        Command::Ask { message, session } => ask(&settings, &session, &message).await,
        Command::ServeJsonl => serve_jsonl(&settings).await,
        Command::Search { query, threshold, limit } => search(&settings, &query, threshold, limit).await,
        Command::Embed { force } => embed(&settings, force).await,
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(std::io::stderr)).init();
}

async fn chat(settings: &Settings, session: &str) -> anyhow::Result<()> {
    let runtime = Runtime::start(settings, StartOptions::default());
    let service = runtime.service().clone();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout.write_all(b"Ask about jobs, salaries, links or upcoming sessions. Type 'quit' to leave.\n> ").await?;
    stdout.flush().await?;
    while let Some(line) = lines.next_line().await? {
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }
        let outcome = service.handle(ChatRequest::new(session, line)).await;
        stdout.write_all(format!("{}\n> ", outcome.body.response.trim_end()).as_bytes()).await?;
        stdout.flush().await?;
    }
    Ok(())
}

async fn ask(settings: &Settings, session: &str, message: &str) -> anyhow::Result<()> {
    let runtime = Runtime::start(settings, StartOptions::default());
    let outcome = runtime.service().handle(ChatRequest::new(session, message)).await;
    println!("{}", outcome.body.response.trim_end());
    anyhow::ensure!(outcome.is_success(), "request failed with status {}", outcome.status);
    Ok(())
}

async fn serve_jsonl(settings: &Settings) -> anyhow::Result<()> {
    let runtime = Runtime::start(settings, StartOptions::default());
    let service: ChatService = runtime.service().clone();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = match serde_json::from_str::<ChatRequest>(&line) {
            Ok(request) => {
                let outcome = service.handle(request).await;
                serde_json::json!({ "status": outcome.status, "response": outcome.body.response })
            }
            Err(e) => {
                warn!(error = %e, "malformed request line");
                serde_json::json!({ "status": 400, "error": format!("malformed request: {e}") })
            }
        };
        let mut out = serde_json::to_vec(&reply)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }
    Ok(())
}

async fn search(settings: &Settings, query: &str, threshold: Option<f32>, limit: usize) -> anyhow::Result<()> {
    let runtime = Runtime::start(settings, StartOptions::default());
    let engine = runtime.service().resolver().engine();
    let threshold = threshold.unwrap_or(engine.threshold());
    let hits = engine.search_with_threshold(query, threshold).await?;

    println!("Found {} listings at threshold {:.2} for: \"{}\"", hits.len(), threshold, query);
    for (rank, hit) in hits.iter().take(limit).enumerate() {
        println!(
            "{:>3}. {:.4}  {} at {}  [{}]",
            rank + 1,
            hit.score,
            hit.record.title_or_default(),
            hit.record.company_or_default(),
            hit.record.id
        );
    }
    Ok(())
}

async fn embed(settings: &Settings, force: bool) -> anyhow::Result<()> {
    let options = StartOptions { show_progress: true, force_rebuild: force };
    let (_, report) = Runtime::start(settings, options).finish_build().await?;
    let how = match report.source {
        BuildSource::Cache => "loaded from cache".to_string(),
        BuildSource::Computed => format!("computed and cached at {}", settings.data.embedding_cache.display()),
        BuildSource::Degraded { failed } => format!("computed with {failed} failures (cache not written)"),
    };
    println!("{}/{} job listings embedded, {}", report.embedded, report.records, how);
    Ok(())
}
