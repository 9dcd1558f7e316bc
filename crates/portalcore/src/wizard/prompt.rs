//! User-facing wizard replies.
//!
//! Prompts are typed so handlers and tests can inspect them; `render`
//! produces the plain-text message that goes to the chat.

use indoc::{formatdoc, indoc};
use std::fmt;

use super::session::{StepError, WizardStep};
use super::types::ResolvedChat;
use crate::core::config::wizard::{CANCEL_COMMAND, SKIP_COMMAND, TOTAL_STEPS};
use crate::storage::portals::PortalId;

/// A reply produced by the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Asks for the input of `step`; `verified` is the chat confirmed by the
    /// previous step, if any
    Step {
        step: WizardStep,
        verified: Option<ResolvedChat>,
    },
    /// Input rejected; `step` is asked again
    Rejected { step: WizardStep, error: StepError },
    /// Portal stored
    Completed {
        portal_id: PortalId,
        channel: ResolvedChat,
        group: ResolvedChat,
        welcome_text: Option<String>,
    },
    /// Portal could not be stored; the session is gone
    PersistFailed,
    /// User cancelled
    Cancelled,
    /// Session swept after inactivity
    Expired,
}

impl Prompt {
    /// Step number this prompt is about, if it asks for input.
    pub fn step_number(&self) -> Option<u8> {
        match self {
            Prompt::Step { step, .. } | Prompt::Rejected { step, .. } => step.number(),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Prompt::Rejected { .. } | Prompt::PersistFailed)
    }

    pub fn render(&self) -> String {
        match self {
            Prompt::Step { step, verified } => {
                let mut text = String::new();
                if let Some(chat) = verified {
                    text.push_str(&verified_line(chat));
                    text.push_str("\n\n");
                }
                text.push_str(&step_request(*step));
                text
            }
            Prompt::Rejected { step, error } => {
                format!("{}\n\n{}", rejection_text(error), step_request(*step))
            }
            Prompt::Completed {
                portal_id,
                channel,
                group,
                welcome_text,
            } => {
                let welcome = match welcome_text {
                    Some(text) => format!("Custom welcome message:\n{}", text),
                    None => "Default welcome message".to_string(),
                };
                formatdoc! {"
                    🎉 Portal created!

                    Portal ID: {portal_id}
                    📢 Public channel: {channel}
                    🔒 Private group: {group}
                    💬 {welcome}

                    The portal is ready to use.",
                    portal_id = portal_id,
                    channel = channel.display_name(),
                    group = group.display_name(),
                    welcome = welcome,
                }
            }
            Prompt::PersistFailed => {
                "❌ Failed to create portal. Please try again with /portal setup or contact support.".to_string()
            }
            Prompt::Cancelled => "❌ Portal setup cancelled.".to_string(),
            Prompt::Expired => {
                "⌛ Portal setup timed out due to inactivity. Start again with /portal setup.".to_string()
            }
        }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn verified_line(chat: &ResolvedChat) -> String {
    if chat.kind.is_group_like() {
        format!("✅ Group verified: {}", chat.display_name())
    } else {
        format!("✅ Channel verified: {}", chat.display_name())
    }
}

fn step_request(step: WizardStep) -> String {
    match step {
        WizardStep::AwaitingChannel => formatdoc! {"
            🔐 Portal Setup Wizard

            Step 1/{TOTAL_STEPS}: Public Channel

            Please forward a message from your public channel or send the channel username (e.g. @yourchannel).

            ⚠️ Make sure the bot is an admin in the channel!

            Send {CANCEL_COMMAND} to cancel setup."
        },
        WizardStep::AwaitingGroup => formatdoc! {"
            Step 2/{TOTAL_STEPS}: Private Group

            Now forward a message from your private group or send the group username/ID.

            ⚠️ Make sure the bot is an admin in the group with the 'Invite users via link' permission!"
        },
        WizardStep::AwaitingWelcome => formatdoc! {"
            Step 3/{TOTAL_STEPS}: Welcome Message

            Send a custom welcome message for users (or {SKIP_COMMAND} to use the default).

            This message will be shown when users click the verify button."
        },
        _ => String::new(),
    }
}

fn rejection_text(error: &StepError) -> String {
    match error {
        StepError::UnrecognizedInput => indoc!("
            ❌ Invalid input!

            Please either:
            • Forward a message from the chat
            • Send its username (e.g. @yourchat)
            • Send its ID (e.g. -1001234567890)"
        )
        .to_string(),
        StepError::ChatUnreachable(_) => indoc!("
            ❌ Could not find that chat or I don't have access to it.

            Please:
            1. Make sure the username/ID is correct
            2. Add me to the chat as an admin
            3. Try forwarding a message from the chat instead"
        )
        .to_string(),
        StepError::NotAdmin(chat) => format!("❌ I'm not an admin in {}!\n\nPlease make me an admin and try again.", chat),
        StepError::InsufficientPermission { chat, .. } => format!(
            "❌ I don't have permission to create invite links in {}!\n\nPlease give me the 'Invite users via link' permission and try again.",
            chat
        ),
        StepError::WrongChatKind { chat, expected, .. } => {
            format!("❌ {} is not a {}!", chat, expected)
        }
        StepError::WelcomeNotText => {
            format!("❌ Please send the welcome message as text, or {} to use the default.", SKIP_COMMAND)
        }
        StepError::Transport(_) => {
            "⚠️ Telegram did not answer in time. Please send the same input again in a moment.".to_string()
        }
    }
}
