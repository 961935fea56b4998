use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use review_relay::{
    AndroidAdapter, AppleAdapter, Config, GoogleTranslator, HistoryStore, JsonHistoryStore,
    Orchestrator, Scope, SlackWebhookSender, StoreKind, TokioDelay,
};

#[derive(Parser)]
#[command(name = "review-relay")]
#[command(about = "Relays new app store reviews to Slack")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the YAML configuration file
    #[arg(long, default_value = "review-relay.yml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll all configured stores and post anything new
    Run {
        /// Only process this app
        #[arg(long)]
        app: Option<String>,
    },

    /// Show the delivery history for one scope
    History {
        /// App name as configured
        app: String,

        /// Store name (Apple storefront name, or the Android language)
        store: String,

        /// Store kind: android, ios or macos
        #[arg(long, default_value = "ios")]
        kind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("review_relay=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run { app } => run(config, app).await,
        Commands::History { app, store, kind } => show_history(config, &app, &store, &kind),
    }
}

async fn run(config: Config, only_app: Option<String>) -> Result<()> {
    let history = JsonHistoryStore::new(&config.history_dir, config.history_cap)?;
    let sender = SlackWebhookSender::new(&config.slack.webhook_url, &config.slack.username);
    let translator = GoogleTranslator::new(&config.translation.target_language);

    let orchestrator = Orchestrator::new(
        AndroidAdapter::new().with_output_dir(&config.output_dir),
        AppleAdapter::new().with_output_dir(&config.output_dir),
        history,
        sender,
        translator,
        TokioDelay,
        config.translation.enabled,
    );

    // Scopes run sequentially; a failure in one never stops the others
    for app in &config.apps {
        if let Some(only) = &only_app {
            if &app.name != only {
                continue;
            }
        }

        if let Some(android) = &app.android {
            match std::env::var(&android.token_env) {
                Ok(token) => {
                    if let Err(e) = orchestrator
                        .run_android_scope(&app.name, android, &token)
                        .await
                    {
                        error!(app = %app.name, error = %e, "Android scope failed");
                    }
                }
                Err(_) => {
                    error!(
                        app = %app.name,
                        env = %android.token_env,
                        "Play publisher token not set, skipping Android scope"
                    );
                }
            }
        }

        for store in &app.apple_stores {
            if let Err(e) = orchestrator.run_apple_scope(&app.name, store).await {
                error!(app = %app.name, store = %store.name, error = %e, "Apple scope failed");
            }
        }
    }

    info!("Run complete");

    Ok(())
}

fn show_history(config: Config, app: &str, store: &str, kind: &str) -> Result<()> {
    let kind: StoreKind = kind
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("Invalid store kind")?;

    let history = JsonHistoryStore::new(&config.history_dir, config.history_cap)?;
    let scope = Scope::new(app, store, kind);
    let window = history.load(&scope)?;

    if window.is_empty() {
        println!("No history for {}.", scope);
        return Ok(());
    }

    println!("History for {} ({} entries):\n", scope, window.len());
    for entry in window.entries() {
        println!("  {} by {}", entry.id, entry.author);
        println!("    {}", entry.body);
        println!("    {}", entry.permalink);
        println!();
    }

    Ok(())
}
