//! Conversion of Telegram messages into wizard input.

use teloxide::types::{Chat, Message, MessageOrigin};

use portalcore::config::wizard::{CANCEL_COMMAND, SKIP_COMMAND};
use portalcore::wizard::{ChatKind, ForwardedChat, IncomingMessage, OwnerId};

/// Wizard owner for a message: its sender.
pub fn owner_id(msg: &Message) -> Option<OwnerId> {
    msg.from
        .as_ref()
        .and_then(|user| i64::try_from(user.id.0).ok())
        .map(OwnerId)
}

pub fn incoming_message(msg: &Message) -> IncomingMessage {
    IncomingMessage {
        text: msg.text().map(str::to_string),
        forwarded_from: msg.forward_origin().and_then(forwarded_chat),
    }
}

/// Chat named by a forward origin. Forwards from users carry no chat.
pub fn forwarded_chat(origin: &MessageOrigin) -> Option<ForwardedChat> {
    match origin {
        MessageOrigin::Channel { chat, .. } => Some(from_chat(chat)),
        MessageOrigin::Chat { sender_chat, .. } => Some(from_chat(sender_chat)),
        _ => None,
    }
}

pub(crate) fn chat_kind(is_channel: bool, is_supergroup: bool, is_group: bool) -> ChatKind {
    if is_channel {
        ChatKind::Channel
    } else if is_supergroup {
        ChatKind::Supergroup
    } else if is_group {
        ChatKind::Group
    } else {
        ChatKind::Private
    }
}

fn from_chat(chat: &Chat) -> ForwardedChat {
    ForwardedChat {
        id: chat.id.0,
        kind: chat_kind(chat.is_channel(), chat.is_supergroup(), chat.is_group()),
        title: chat.title().map(str::to_string),
        username: chat.username().map(str::to_string),
    }
}

/// Whether a message from a user with a session belongs to the wizard.
///
/// Forwards, plain text, `/skip` and `/cancel` do. Every other command goes
/// to the regular command handler and leaves the session alone.
pub fn claimed_by_wizard(message: &IncomingMessage) -> bool {
    if message.forwarded_from.is_some() {
        return true;
    }
    match message.command() {
        Some(_) => message.is_command(SKIP_COMMAND) || message.is_command(CANCEL_COMMAND),
        None => message.text.is_some(),
    }
}
