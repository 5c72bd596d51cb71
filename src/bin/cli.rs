//! Listing watcher CLI
//!
//! Polls marketplace search pages and posts new listings to a Telegram chat.
//! `BOT_TOKEN` and `CHAT_ID` are read from the environment or a `.env` file.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use listing_watcher::{
    error::Result,
    models::{Config, Credentials},
    pipeline::{ActionListener, PollLoop, RetryPolicy},
    services::{
        CallbackHandler, HttpPageSource, ListingExtractor, Messenger, Notifier, TelegramClient,
    },
    storage::{LinkStore, PendingActions},
};

/// Marketplace listing watcher
#[derive(Parser, Debug)]
#[command(name = "listing-watcher", version, about = "Announces new marketplace listings")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "watcher.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll search pages and answer contact buttons until interrupted
    Run,

    /// Run a single poll cycle without the button listener
    Once {
        /// Index of the search URL to process
        #[arg(long, default_value_t = 0)]
        index: usize,
    },

    /// Validate the configuration file
    Validate,

    /// Show configured URLs and seen-link state
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Shared pieces of the `run` and `once` commands.
struct Watcher {
    poll: PollLoop,
    telegram: Arc<TelegramClient>,
    pending: PendingActions,
    credentials: Credentials,
}

async fn build_watcher(config: &Config) -> Result<Watcher> {
    config.validate()?;
    let credentials = Credentials::from_env()?;

    let telegram = Arc::new(TelegramClient::new(&credentials, &config.telegram)?);
    let messenger: Arc<dyn Messenger> = telegram.clone();
    let pending = PendingActions::new();

    let store = LinkStore::load(&config.storage.links_file).await?;
    log::info!(
        "Loaded {} seen links from {}",
        store.len(),
        store.path().display()
    );

    let notifier = Notifier::new(
        messenger,
        pending.clone(),
        credentials.chat_id.clone(),
        config.telegram.action_prefix.clone(),
        config.messages.clone(),
    );

    let poll = PollLoop::new(
        config.search.urls.clone(),
        store,
        ListingExtractor::from_config(config)?,
        Arc::new(HttpPageSource::new(config)?),
        notifier,
    )?
    .with_timing(config);

    Ok(Watcher {
        poll,
        telegram,
        pending,
        credentials,
    })
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    log::debug!("Configuration: {:?}", config);

    match cli.command {
        Command::Run => {
            let watcher = build_watcher(&config).await?;

            let handler = CallbackHandler::new(
                watcher.telegram.clone(),
                watcher.pending.clone(),
                watcher.credentials.chat_id.clone(),
                config.telegram.action_prefix.clone(),
                config.messages.clone(),
            );
            let listener = ActionListener::new(
                watcher.telegram.clone(),
                handler,
                RetryPolicy::from_config(&config.poll),
            );

            log::info!("Listing watcher started. Waiting for new listings...");

            let poll_task = tokio::spawn(watcher.poll.run());
            let listen_task = tokio::spawn(listener.run());

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Interrupted, shutting down");
                }
                res = poll_task => {
                    log::error!("Poll loop stopped unexpectedly: {:?}", res);
                }
                res = listen_task => {
                    log::error!("Listener stopped unexpectedly: {:?}", res);
                }
            }
        }

        Command::Once { index } => {
            let watcher = build_watcher(&config).await?;
            let mut poll = watcher.poll.with_start_index(index);

            let report = poll.run_cycle().await?;
            log::info!(
                "Processed {}: {} listings, {} notified, {} delivery failures",
                report.url,
                report.extracted,
                report.notified,
                report.delivery_failures
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({} search URLs)", config.search.urls.len());

            match Credentials::from_env() {
                Ok(creds) => log::info!("✓ Credentials present for chat {}", creds.chat_id),
                Err(e) => log::warn!("{}", e),
            }

            log::info!("All validations passed!");
        }

        Command::Info => {
            let store = LinkStore::load(&config.storage.links_file).await?;
            log::info!(
                "Seen links: {} ({})",
                store.len(),
                store.path().display()
            );
            for (i, url) in config.search.urls.iter().enumerate() {
                log::info!("URL {}: {}", i + 1, url);
            }
            log::info!(
                "Poll interval: {}s, retry delay: {}s",
                config.poll.interval_secs,
                config.poll.retry_delay_secs
            );
        }
    }

    Ok(())
}
