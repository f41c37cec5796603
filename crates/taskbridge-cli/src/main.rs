//! taskbridge - source control to task tracker bridge
//!
//! ## Commands
//!
//! - `serve`: run the webhook server
//! - `parse`: print the task references found in some text
//! - `replay`: run a stored webhook payload through the bridge

mod config;
mod server;
mod signature;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use taskbridge_core::{ReferenceAction, ReferenceParser, Reconciler, METRICS};
use taskbridge_tracker::{GithubNotifier, TrackerClient};
use tracing::{info, Level};

use config::BridgeConfig;
use server::AppState;

#[derive(Parser)]
#[command(name = "taskbridge")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sync task tracker state from source-control webhooks", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "TASKBRIDGE_CONFIG",
        default_value = "taskbridge.toml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server
    Serve {
        /// Listen address (overrides `server.listen`)
        #[arg(long, env = "TASKBRIDGE_LISTEN")]
        listen: Option<String>,
    },

    /// Print task references found in TEXT (or stdin) as JSON lines
    Parse {
        text: Option<String>,

        /// Task prefix (overrides `task_prefix`; no config file needed)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Process a stored webhook payload and print the outcome
    Replay {
        /// Event type, as sent in X-GitHub-Event
        #[arg(long)]
        event: String,

        /// Payload file (JSON)
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    taskbridge_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Serve { listen } => cmd_serve(&cli.config, listen.as_deref()).await,
        Commands::Parse { text, prefix } => cmd_parse(&cli.config, text, prefix.as_deref()),
        Commands::Replay { event, file } => cmd_replay(&cli.config, &event, &file).await,
    }
}

/// Wire the tracker client, optional GitHub notifier and reconciler.
fn build_reconciler(config: &BridgeConfig) -> Result<Reconciler> {
    let parser = ReferenceParser::new(&config.task_prefix)?;
    let tracker = TrackerClient::new(&config.tracker, config.stages.done.clone())
        .context("failed to create tracker client")?
        .with_user_mapping(config.user_mapping.clone());

    let mut reconciler = Reconciler::new(parser, config.stages.clone(), Arc::new(tracker));
    if let Some(github) = &config.github {
        let notifier = GithubNotifier::new(github).context("failed to create GitHub client")?;
        reconciler = reconciler.with_notifier(Arc::new(notifier));
    } else {
        info!("no [github] section, pull-request comments disabled");
    }
    Ok(reconciler)
}

async fn cmd_serve(config_path: &Path, listen: Option<&str>) -> Result<()> {
    let config = BridgeConfig::load(config_path)?;
    let listen = listen.unwrap_or(&config.server.listen).to_string();

    let mut state = AppState::new(build_reconciler(&config)?);
    match config.server.webhook_secret.as_deref() {
        Some(secret) => state = state.with_webhook_secret(secret),
        None => info!("no webhook secret configured, deliveries are not authenticated"),
    }

    server::serve(state, &listen).await
}

#[derive(Serialize)]
struct ParsedReference {
    task: String,
    task_id: u64,
    action: ReferenceAction,
}

fn cmd_parse(config_path: &Path, text: Option<String>, prefix: Option<&str>) -> Result<()> {
    let prefix = match prefix {
        Some(prefix) => prefix.to_string(),
        None => BridgeConfig::load_prefix(config_path)?,
    };
    let parser = ReferenceParser::new(&prefix)?;

    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    for reference in parser.parse(&text) {
        let line = ParsedReference {
            task: parser.display_id(reference.task_id),
            task_id: reference.task_id.0,
            action: reference.action,
        };
        println!("{}", serde_json::to_string(&line)?);
    }
    Ok(())
}

async fn cmd_replay(config_path: &Path, event: &str, file: &Path) -> Result<()> {
    let config = BridgeConfig::load(config_path)?;
    let payload = std::fs::read(file).with_context(|| format!("failed to read {:?}", file))?;

    let reconciler = build_reconciler(&config)?;
    let outcome = reconciler.handle_event(event, &payload).await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    METRICS.flush();
    Ok(())
}
