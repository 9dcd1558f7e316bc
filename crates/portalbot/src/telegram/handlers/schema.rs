//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::commands::{handle_command, handle_portal_setup, handle_wizard_message};
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::{Command, PortalAction};
use crate::telegram::input::{claimed_by_wizard, incoming_message, owner_id};

/// Creates the dispatcher schema for the bot.
///
/// Order matters: the setup entry point comes first so `/portal setup`
/// always restarts the wizard, then the wizard branch for users with a
/// session in progress, then the generic commands.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(portal_setup_handler(deps.clone()))
        .branch(wizard_message_handler(deps.clone()))
        .branch(command_handler(deps))
}

/// Handler for `/portal setup`
fn portal_setup_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_command::<Command>()
        .filter(|cmd: Command| cmd.portal_action() == Some(PortalAction::Setup))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                log::info!("Portal setup requested in chat {}", msg.chat.id);
                handle_portal_setup(&bot, &msg, &deps).await
            }
        })
}

/// Handler for input of users whose wizard is in progress (private chats only)
fn wizard_message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let filter_deps = deps.clone();

    Update::filter_message()
        .filter(move |msg: Message| {
            msg.chat.is_private()
                && owner_id(&msg).is_some_and(|owner| filter_deps.orchestrator.has_session(owner))
                && claimed_by_wizard(&incoming_message(&msg))
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_wizard_message(&bot, &msg, &deps).await }
        })
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move { handle_command(&bot, &msg, cmd, &deps).await }
        },
    ))
}
