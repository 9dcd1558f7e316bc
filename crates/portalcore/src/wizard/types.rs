//! Transport-neutral types shared by the wizard components.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of the user driving a wizard session (Telegram user id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(pub i64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of a Telegram chat.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    /// Groups and supergroups both qualify as the private side of a portal.
    pub fn is_group_like(self) -> bool {
        matches!(self, ChatKind::Group | ChatKind::Supergroup)
    }
}

/// Chat taken from the origin metadata of a forwarded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedChat {
    pub id: i64,
    pub kind: ChatKind,
    pub title: Option<String>,
    pub username: Option<String>,
}

/// Canonical reference to a chat, as extracted from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRef {
    /// Origin of a forwarded message; already carries id and kind
    Forwarded(ForwardedChat),
    /// Public username, stored without the leading `@`
    Handle(String),
    /// Numeric chat id (channels and supergroups are negative)
    Id(i64),
}

impl fmt::Display for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRef::Forwarded(chat) => match &chat.title {
                Some(title) => write!(f, "{} ({})", title, chat.id),
                None => write!(f, "{}", chat.id),
            },
            ChatRef::Handle(handle) => write!(f, "@{}", handle),
            ChatRef::Id(id) => write!(f, "{}", id),
        }
    }
}

/// A chat as reported back by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedChat {
    pub id: i64,
    pub kind: ChatKind,
    pub title: Option<String>,
    pub username: Option<String>,
}

impl ResolvedChat {
    /// Best human-readable name: title, then `@username`, then the id.
    pub fn display_name(&self) -> String {
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            return title.to_string();
        }
        if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            return format!("@{}", username);
        }
        self.id.to_string()
    }
}

impl From<ForwardedChat> for ResolvedChat {
    fn from(chat: ForwardedChat) -> Self {
        Self {
            id: chat.id,
            kind: chat.kind,
            title: chat.title,
            username: chat.username,
        }
    }
}

/// A user message reduced to what the wizard looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingMessage {
    pub text: Option<String>,
    pub forwarded_from: Option<ForwardedChat>,
}

impl IncomingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            forwarded_from: None,
        }
    }

    pub fn forwarded(chat: ForwardedChat) -> Self {
        Self {
            text: None,
            forwarded_from: Some(chat),
        }
    }

    /// Name of the bot command this message carries, without the leading
    /// slash and without a `@botname` suffix.
    pub fn command(&self) -> Option<&str> {
        let text = self.text.as_deref()?.trim();
        let command = text.strip_prefix('/')?.split_whitespace().next()?;
        let name = command.split('@').next().unwrap_or(command);
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Whether this message is the given command (`"/skip"` style).
    pub fn is_command(&self, command: &str) -> bool {
        let wanted = command.trim_start_matches('/');
        self.command().is_some_and(|name| name.eq_ignore_ascii_case(wanted))
    }
}
