//! Bot initialization
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command registration in the Telegram UI

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use portalcore::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "show the welcome message")]
    Start,
    #[command(description = "show this help")]
    Help,
    #[command(description = "portals: /portal setup to create one, /portal list to see yours")]
    Portal(String),
    #[command(description = "cancel the portal setup in progress")]
    Cancel,
    #[command(description = "use the default welcome message during setup")]
    Skip,
}

/// Sub-action of `/portal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalAction {
    Setup,
    List,
    Usage,
}

impl Command {
    /// Action requested by a `/portal` command, `None` for other commands.
    pub fn portal_action(&self) -> Option<PortalAction> {
        let Command::Portal(arg) = self else {
            return None;
        };
        let action = match arg.trim().to_ascii_lowercase().as_str() {
            "setup" => PortalAction::Setup,
            "list" => PortalAction::List,
            _ => PortalAction::Usage,
        };
        Some(action)
    }
}

/// Creates a Bot instance with custom or default API URL
///
/// The token comes from `BOT_TOKEN`, falling back to `TELOXIDE_TOKEN`.
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Missing token, invalid URL or HTTP client failure
pub fn create_bot() -> anyhow::Result<Bot> {
    if config::BOT_TOKEN.is_empty() {
        anyhow::bail!("BOT_TOKEN (or TELOXIDE_TOKEN) is not set");
    }

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(config::BOT_TOKEN.as_str(), client);

    let bot = match config::BOT_API_URL.as_deref() {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}
