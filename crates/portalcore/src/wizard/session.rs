//! Per-user wizard session and its state machine.
//!
//! Every transition is a plain method on [`WizardSession`] taking already
//! computed inputs (classification, verification outcome, welcome text), so
//! the whole machine is testable without a transport or a store.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::types::{ChatKind, OwnerId, ResolvedChat};
use super::verifier::{PermissionFlag, VerificationResult, VerifyError};
use crate::storage::portals::NewPortal;

/// Where a session currently is.
///
/// Ordering follows progress through the wizard; the three terminal states
/// sort after every input step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardStep {
    AwaitingChannel,
    AwaitingGroup,
    AwaitingWelcome,
    Complete,
    PersistFailed,
    Aborted,
}

impl WizardStep {
    pub fn is_terminal(self) -> bool {
        matches!(self, WizardStep::Complete | WizardStep::PersistFailed | WizardStep::Aborted)
    }

    /// 1-based number of an input step, `None` for terminal states.
    pub fn number(self) -> Option<u8> {
        match self {
            WizardStep::AwaitingChannel => Some(1),
            WizardStep::AwaitingGroup => Some(2),
            WizardStep::AwaitingWelcome => Some(3),
            _ => None,
        }
    }
}

/// Why the current step did not advance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("input is neither a forwarded message, an @handle nor a chat id")]
    UnrecognizedInput,

    #[error("chat unreachable: {0}")]
    ChatUnreachable(String),

    #[error("bot is not an administrator in {0}")]
    NotAdmin(String),

    #[error("bot lacks the {permission} permission in {chat}")]
    InsufficientPermission { chat: String, permission: PermissionFlag },

    #[error("{chat} is a {actual}, expected a {expected}")]
    WrongChatKind {
        chat: String,
        actual: ChatKind,
        expected: ChatKind,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("welcome message must be text")]
    WelcomeNotText,
}

impl From<VerifyError> for StepError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::ChatUnreachable(reason) => StepError::ChatUnreachable(reason),
            VerifyError::Transport(reason) => StepError::Transport(reason),
        }
    }
}

/// Result of feeding one input into a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Moved to the next input step; carries the chat just verified
    Advanced { to: WizardStep, verified: ResolvedChat },
    /// Stayed on the same step
    Stayed { step: WizardStep, error: StepError },
    /// All input collected; the portal is ready to be persisted
    Finished(NewPortal),
    /// Input does not apply to the current step (terminal or wrong step)
    Ignored,
}

/// One setup attempt by one user.
#[derive(Debug, Clone)]
pub struct WizardSession {
    id: Uuid,
    owner_id: OwnerId,
    step: WizardStep,
    channel: Option<ResolvedChat>,
    group: Option<ResolvedChat>,
    welcome_text: Option<String>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl WizardSession {
    pub fn new(owner_id: OwnerId, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            step: WizardStep::AwaitingChannel,
            channel: None,
            group: None,
            welcome_text: None,
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn channel(&self) -> Option<&ResolvedChat> {
        self.channel.as_ref()
    }

    pub fn group(&self) -> Option<&ResolvedChat> {
        self.group.as_ref()
    }

    pub fn welcome_text(&self) -> Option<&str> {
        self.welcome_text.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }

    /// Records user activity; expiry is measured from the last touch.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_activity_at {
            self.last_activity_at = now;
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, timeout: chrono::Duration) -> bool {
        now - self.last_activity_at > timeout
    }

    /// The current input step could not make sense of the message.
    pub fn reject_input(&mut self, now: DateTime<Utc>) -> Transition {
        let error = match self.step {
            WizardStep::AwaitingChannel | WizardStep::AwaitingGroup => StepError::UnrecognizedInput,
            WizardStep::AwaitingWelcome => StepError::WelcomeNotText,
            _ => return Transition::Ignored,
        };
        self.touch(now);
        Transition::Stayed { step: self.step, error }
    }

    /// Applies a verification outcome to the channel or group step.
    ///
    /// A failed verification never changes the step.
    pub fn accept_chat(&mut self, outcome: Result<VerificationResult, VerifyError>, now: DateTime<Utc>) -> Transition {
        let step = self.step;
        if !matches!(step, WizardStep::AwaitingChannel | WizardStep::AwaitingGroup) {
            return Transition::Ignored;
        }
        self.touch(now);

        let verified = match outcome.map_err(StepError::from).and_then(|v| check_requirements(step, v)) {
            Ok(chat) => chat,
            Err(error) => return Transition::Stayed { step, error },
        };

        if step == WizardStep::AwaitingChannel {
            self.channel = Some(verified.clone());
            self.step = WizardStep::AwaitingGroup;
        } else {
            self.group = Some(verified.clone());
            self.step = WizardStep::AwaitingWelcome;
        }

        Transition::Advanced { to: self.step, verified }
    }

    /// Applies the welcome step. `None`, empty or whitespace-only text skips
    /// the welcome message.
    pub fn accept_welcome(&mut self, text: Option<&str>, now: DateTime<Utc>) -> Transition {
        if self.step != WizardStep::AwaitingWelcome {
            return Transition::Ignored;
        }
        let (Some(channel), Some(group)) = (self.channel.clone(), self.group.clone()) else {
            return Transition::Ignored;
        };
        self.touch(now);

        self.welcome_text = text.filter(|t| !t.trim().is_empty()).map(str::to_string);
        self.step = WizardStep::Complete;

        Transition::Finished(NewPortal {
            channel,
            group,
            welcome_text: self.welcome_text.clone(),
            created_by: self.owner_id,
        })
    }

    /// Marks the session as failed to persist. Only valid right after
    /// completion.
    pub fn mark_persist_failed(&mut self) {
        if self.step == WizardStep::Complete {
            self.step = WizardStep::PersistFailed;
        }
    }

    /// Moves a live session to `Aborted`. Returns `false` if it was already
    /// terminal.
    pub fn abort(&mut self) -> bool {
        if self.step.is_terminal() {
            return false;
        }
        self.step = WizardStep::Aborted;
        true
    }

    /// Field/step consistency: the channel is set iff the session got past
    /// step 1, the group iff it got past step 2.
    pub fn is_consistent(&self) -> bool {
        match self.step {
            WizardStep::AwaitingChannel => self.channel.is_none() && self.group.is_none(),
            WizardStep::AwaitingGroup => self.channel.is_some() && self.group.is_none(),
            WizardStep::AwaitingWelcome | WizardStep::Complete | WizardStep::PersistFailed => {
                self.channel.is_some() && self.group.is_some()
            }
            // Aborted keeps whatever was collected
            WizardStep::Aborted => self.group.is_none() || self.channel.is_some(),
        }
    }
}

/// Step-specific acceptance rules for a verified chat.
fn check_requirements(step: WizardStep, result: VerificationResult) -> Result<ResolvedChat, StepError> {
    let name = result.chat.display_name();

    if !result.is_admin {
        return Err(StepError::NotAdmin(name));
    }

    match step {
        WizardStep::AwaitingChannel => {
            if result.chat.kind != ChatKind::Channel {
                return Err(StepError::WrongChatKind {
                    chat: name,
                    actual: result.chat.kind,
                    expected: ChatKind::Channel,
                });
            }
        }
        _ => {
            if !result.chat.kind.is_group_like() {
                return Err(StepError::WrongChatKind {
                    chat: name,
                    actual: result.chat.kind,
                    expected: ChatKind::Group,
                });
            }
            if !result.has(PermissionFlag::InviteUsers) {
                return Err(StepError::InsufficientPermission {
                    chat: name,
                    permission: PermissionFlag::InviteUsers,
                });
            }
        }
    }

    Ok(result.chat)
}
