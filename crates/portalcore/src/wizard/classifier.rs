//! Input classification: turns a user message into a chat reference.
//!
//! Rules, in priority order:
//! 1. forwarded-message origin (channel or chat)
//! 2. `@handle`
//! 3. signed numeric chat id
//!
//! Nothing here talks to Telegram; verification happens later.

use lazy_regex::{regex_captures, regex_is_match};

use super::types::{ChatRef, IncomingMessage};

/// Result of classifying a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Chat(ChatRef),
    Unrecognized,
}

/// Classifies a message into a canonical chat reference.
pub fn classify(message: &IncomingMessage) -> Classified {
    if let Some(origin) = &message.forwarded_from {
        return Classified::Chat(ChatRef::Forwarded(origin.clone()));
    }

    let Some(text) = message.text.as_deref().map(str::trim) else {
        return Classified::Unrecognized;
    };

    if let Some(handle) = parse_handle(text) {
        return Classified::Chat(ChatRef::Handle(handle.to_string()));
    }

    if let Some(id) = parse_chat_id(text) {
        return Classified::Chat(ChatRef::Id(id));
    }

    Classified::Unrecognized
}

/// Extracts the username from `@handle` text (Telegram rules: 5-32 chars,
/// starts with a letter).
fn parse_handle(text: &str) -> Option<&str> {
    regex_captures!(r"^@([A-Za-z][A-Za-z0-9_]{4,31})$", text).map(|(_, handle)| handle)
}

fn parse_chat_id(text: &str) -> Option<i64> {
    if !regex_is_match!(r"^[+-]?[0-9]{1,19}$", text) {
        return None;
    }
    text.parse::<i64>().ok().filter(|id| *id != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::types::{ChatKind, ForwardedChat};
    use pretty_assertions::assert_eq;

    fn forwarded_channel() -> ForwardedChat {
        ForwardedChat {
            id: -1001234567890,
            kind: ChatKind::Channel,
            title: Some("My Channel".to_string()),
            username: Some("mychannel".to_string()),
        }
    }

    #[test]
    fn test_forwarded_origin_wins_over_text() {
        let message = IncomingMessage {
            text: Some("@othergroup".to_string()),
            forwarded_from: Some(forwarded_channel()),
        };
        assert_eq!(classify(&message), Classified::Chat(ChatRef::Forwarded(forwarded_channel())));
    }

    #[test]
    fn test_handle() {
        assert_eq!(
            classify(&IncomingMessage::text("@mychannel")),
            Classified::Chat(ChatRef::Handle("mychannel".to_string()))
        );
        assert_eq!(
            classify(&IncomingMessage::text("  @My_Group_42 \n")),
            Classified::Chat(ChatRef::Handle("My_Group_42".to_string()))
        );
    }

    #[test]
    fn test_invalid_handles() {
        for text in ["@abc", "@1channel", "@my channel", "@", "mychannel", "@_under", "@toolong_handle_abcdefghijklmnopqrstuvwxyz"] {
            assert_eq!(classify(&IncomingMessage::text(text)), Classified::Unrecognized, "{}", text);
        }
    }

    #[test]
    fn test_numeric_ids() {
        assert_eq!(
            classify(&IncomingMessage::text("-1001234567890")),
            Classified::Chat(ChatRef::Id(-1001234567890))
        );
        assert_eq!(classify(&IncomingMessage::text("42")), Classified::Chat(ChatRef::Id(42)));
        assert_eq!(classify(&IncomingMessage::text("+42")), Classified::Chat(ChatRef::Id(42)));
    }

    #[test]
    fn test_invalid_numbers() {
        for text in ["0", "-", "12.5", "-99999999999999999999", "1e10", "- 100"] {
            assert_eq!(classify(&IncomingMessage::text(text)), Classified::Unrecognized, "{}", text);
        }
    }

    #[test]
    fn test_empty_and_commands() {
        assert_eq!(classify(&IncomingMessage::default()), Classified::Unrecognized);
        assert_eq!(classify(&IncomingMessage::text("   ")), Classified::Unrecognized);
        assert_eq!(classify(&IncomingMessage::text("/skip")), Classified::Unrecognized);
    }
}
