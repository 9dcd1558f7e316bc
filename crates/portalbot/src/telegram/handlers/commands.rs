//! Command and wizard handler implementations

use indoc::indoc;
use teloxide::prelude::*;
use teloxide::types::Message;
use teloxide::utils::command::BotCommands;

use portalcore::config::wizard::{CANCEL_COMMAND, SKIP_COMMAND};
use portalcore::wizard::{Dispatch, IncomingMessage, OwnerId};
use portalcore::Portal;

use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::{Command, PortalAction};
use crate::telegram::input::{incoming_message, owner_id};
use crate::telegram::notifications::send_prompt;

pub fn start_text() -> String {
    indoc!(
        "
        👋 Hi! I link a public channel to a private group.

        Use /portal setup to create a portal. I will ask for the channel, the group and an optional welcome message, and check that I am an admin in both chats."
    )
    .to_string()
}

pub fn help_text() -> String {
    Command::descriptions().to_string()
}

pub fn portal_usage_text() -> String {
    indoc!(
        "
        Usage:
        /portal setup - create a new portal
        /portal list - show your portals"
    )
    .to_string()
}

const NO_CANCEL_TEXT: &str = "There is no portal setup to cancel.";
const NO_SKIP_TEXT: &str = "Nothing to skip right now.";

/// Reply for wizard input whose session ended before it was handled
/// (swept or finished in between). Mirrors what the command branch would
/// have said.
pub fn no_session_text(message: &IncomingMessage) -> String {
    if message.is_command(CANCEL_COMMAND) {
        NO_CANCEL_TEXT.to_string()
    } else if message.is_command(SKIP_COMMAND) {
        NO_SKIP_TEXT.to_string()
    } else {
        "There is no portal setup in progress. Use /portal setup to start one.".to_string()
    }
}

/// One line per portal, newest last.
pub fn format_portal_list(portals: &[Portal]) -> String {
    if portals.is_empty() {
        return "You have no portals yet. Create one with /portal setup.".to_string();
    }

    let mut text = String::from("📋 Your portals:\n");
    for portal in portals {
        let status = if portal.active { "✅" } else { "⏸" };
        text.push_str(&format!(
            "\n#{} {} {} → {}",
            portal.id,
            status,
            portal.channel.display_name(),
            portal.group.display_name()
        ));
    }
    text
}

/// Handle `/portal setup`: start or restart the wizard.
pub(super) async fn handle_portal_setup(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    if !msg.chat.is_private() {
        bot.send_message(msg.chat.id, "Please run /portal setup in a private chat with me.")
            .await?;
        return Ok(());
    }
    let Some(owner) = owner_id(msg) else {
        return Ok(());
    };

    let prompt = deps.orchestrator.handle_entry(owner);
    send_prompt(bot, msg.chat.id, &prompt).await?;
    Ok(())
}

/// Handle a message that belongs to a wizard in progress.
pub(super) async fn handle_wizard_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(owner) = owner_id(msg) else {
        return Ok(());
    };

    let incoming = incoming_message(msg);
    match deps.orchestrator.handle_message(owner, &incoming).await {
        Dispatch::Reply(prompt) => send_prompt(bot, msg.chat.id, &prompt).await?,
        Dispatch::Discarded => log::debug!("Wizard reply for user {} discarded", owner),
        Dispatch::NoSession => {
            log::debug!("Wizard session of user {} ended before its message was handled", owner);
            bot.send_message(msg.chat.id, no_session_text(&incoming)).await?;
        }
    }
    Ok(())
}

/// Handle the generic bot commands.
pub(super) async fn handle_command(
    bot: &Bot,
    msg: &Message,
    cmd: Command,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

    match cmd {
        Command::Start => {
            bot.send_message(msg.chat.id, start_text()).await?;
        }
        Command::Help => {
            bot.send_message(msg.chat.id, help_text()).await?;
        }
        Command::Portal(_) => match cmd.portal_action() {
            Some(PortalAction::List) => {
                if let Some(owner) = owner_id(msg) {
                    send_portal_list(bot, msg, owner, deps).await?;
                }
            }
            Some(PortalAction::Setup) => handle_portal_setup(bot, msg, deps).await?,
            _ => {
                bot.send_message(msg.chat.id, portal_usage_text()).await?;
            }
        },
        Command::Cancel => {
            let dispatch = match owner_id(msg) {
                Some(owner) => deps.orchestrator.handle_cancel(owner).await,
                None => Dispatch::NoSession,
            };
            match dispatch {
                Dispatch::Reply(prompt) => send_prompt(bot, msg.chat.id, &prompt).await?,
                _ => {
                    bot.send_message(msg.chat.id, NO_CANCEL_TEXT).await?;
                }
            }
        }
        Command::Skip => {
            bot.send_message(msg.chat.id, NO_SKIP_TEXT).await?;
        }
    }

    Ok(())
}

async fn send_portal_list(bot: &Bot, msg: &Message, owner: OwnerId, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let text = match deps.portals.portals_for_owner(owner).await {
        Ok(portals) => format_portal_list(&portals),
        Err(e) => {
            log::error!("Failed to load portals of user {}: {}", owner, e);
            "❌ Could not load your portals. Please try again later.".to_string()
        }
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portalcore::wizard::{ChatKind, ResolvedChat};
    use portalcore::PortalId;

    fn portal(id: i64, active: bool) -> Portal {
        Portal {
            id: PortalId(id),
            channel: ResolvedChat {
                id: -1001,
                kind: ChatKind::Channel,
                title: Some("My Channel".to_string()),
                username: Some("mychannel".to_string()),
            },
            group: ResolvedChat {
                id: -1002,
                kind: ChatKind::Supergroup,
                title: None,
                username: Some("mygroup".to_string()),
            },
            welcome_text: None,
            created_by: OwnerId(1),
            created_at: Default::default(),
            active,
        }
    }

    #[test]
    fn test_format_portal_list() {
        let text = format_portal_list(&[portal(1, true), portal(2, false)]);

        assert!(text.starts_with("📋 Your portals:"));
        assert!(text.contains("#1 ✅ My Channel → @mygroup"));
        assert!(text.contains("#2 ⏸ My Channel → @mygroup"));
    }

    #[test]
    fn test_empty_portal_list() {
        assert!(format_portal_list(&[]).contains("/portal setup"));
    }

    #[test]
    fn test_no_session_text() {
        assert_eq!(no_session_text(&IncomingMessage::text("/cancel@portalbot")), NO_CANCEL_TEXT);
        assert_eq!(no_session_text(&IncomingMessage::text("/skip")), NO_SKIP_TEXT);
        assert!(no_session_text(&IncomingMessage::text("@mychannel")).contains("/portal setup"));
    }

    #[test]
    fn test_help_lists_commands() {
        let help = help_text();
        assert!(help.contains("/portal"));
        assert!(help.contains("/start"));
        assert!(portal_usage_text().contains("/portal list"));
        assert!(start_text().contains("/portal setup"));
    }
}
