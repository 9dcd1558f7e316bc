use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::Me;
use teloxide::update_listeners::Polling;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use portalbot::cli::{Cli, Commands};
use portalbot::telegram::{create_bot, schema, setup_bot_commands, start_expiry_notifier, HandlerDeps, TeloxideTransport};
use portalcore::storage::{create_pool, SqlitePortalStore};
use portalcore::wizard::{start_sweeper, ChatAdminVerifier, OwnerId, SessionStore, WizardConfig, WizardOrchestrator};
use portalcore::{config, init_logger, PortalStore};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // .env first so it can set LOG_FILE_PATH
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        None | Some(Commands::Run) => run_bot().await,
        Some(Commands::ListPortals { owner }) => list_portals(OwnerId(owner)).await,
    }
}

async fn run_bot() -> Result<()> {
    log::info!("Starting portal bot");

    let bot = create_bot()?;
    let me = connect(&bot).await?;
    log::info!("Bot username: {:?}, Bot ID: {}", me.username, me.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let db_pool = Arc::new(
        create_pool(&config::DATABASE_PATH).map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?,
    );
    let portals: Arc<dyn PortalStore> = Arc::new(SqlitePortalStore::new(db_pool));

    let transport = Arc::new(TeloxideTransport::new(bot.clone()));
    let verifier = ChatAdminVerifier::new(transport, me.id.0);
    let orchestrator = Arc::new(WizardOrchestrator::new(
        Arc::new(SessionStore::new()),
        verifier,
        Arc::clone(&portals),
        WizardConfig::default(),
    ));

    let shutdown = CancellationToken::new();
    let (sweeper, expiries) = start_sweeper(
        Arc::clone(&orchestrator),
        config::wizard::sweep_interval(),
        shutdown.clone(),
    );
    let notifier = start_expiry_notifier(bot.clone(), expiries);

    let handler = schema(HandlerDeps::new(orchestrator, portals));
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(bot, handler)
        .default_handler(|update| async move {
            log::trace!("Unhandled update {:?}", update.id);
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");

    shutdown.cancel();
    if let Err(e) = sweeper.await {
        log::warn!("Session sweeper ended abnormally: {}", e);
    }
    if let Err(e) = notifier.await {
        log::warn!("Expiry notifier ended abnormally: {}", e);
    }

    Ok(())
}

/// Fetches the bot's own account, retrying while the Bot API is not ready.
async fn connect(bot: &Bot) -> Result<Me> {
    let max_retries = config::retry::MAX_STARTUP_RETRIES;
    let mut attempt = 0;

    loop {
        match bot.get_me().await {
            Ok(me) => return Ok(me),
            Err(e) => {
                let err_str = e.to_string();
                let is_retryable = err_str.contains("restart")
                    || err_str.contains("network")
                    || err_str.contains("connection")
                    || err_str.contains("timed out")
                    || err_str.contains("Connection refused");

                attempt += 1;
                if attempt >= max_retries || !is_retryable {
                    return Err(anyhow::anyhow!(
                        "Failed to connect to Bot API after {} attempt(s): {}",
                        attempt,
                        e
                    ));
                }

                log::warn!(
                    "Bot API not ready (attempt {}/{}): {}. Retrying in {}s...",
                    attempt,
                    max_retries,
                    err_str,
                    config::retry::STARTUP_RETRY_DELAY_SECS
                );
                sleep(config::retry::startup_delay()).await;
            }
        }
    }
}

/// Prints a user's portals as JSON.
async fn list_portals(owner: OwnerId) -> Result<()> {
    let db_pool = Arc::new(
        create_pool(&config::DATABASE_PATH).map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?,
    );
    let store = SqlitePortalStore::new(db_pool);

    let portals = store.portals_for_owner(owner).await?;
    log::info!("Found {} portal(s) for user {}", portals.len(), owner);
    println!("{}", serde_json::to_string_pretty(&portals)?);

    Ok(())
}
