//! Admin verification against the chat transport.
//!
//! The transport is a trait so the wizard has zero teloxide dependency; the
//! bot crate provides the Telegram implementation.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

use super::types::{ChatRef, ResolvedChat};

/// Individual administrator rights the wizard cares about.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum PermissionFlag {
    ManageChat,
    ChangeInfo,
    PostMessages,
    DeleteMessages,
    InviteUsers,
    RestrictMembers,
    PinMessages,
    PromoteMembers,
}

/// Membership status of an account in a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum MemberStatus {
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MemberStatus {
    pub fn is_admin(self) -> bool {
        matches!(self, MemberStatus::Owner | MemberStatus::Administrator)
    }
}

/// What `get_chat_member` reports for the bot account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMemberInfo {
    pub status: MemberStatus,
    pub permissions: BTreeSet<PermissionFlag>,
}

/// Failures reported by a [`ChatTransport`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportFailure {
    /// Chat does not exist or the bot cannot see it
    #[error("chat not found or inaccessible: {0}")]
    NotFound(String),

    /// Network or API availability problem; retrying later may succeed
    #[error("transport error: {0}")]
    Network(String),
}

/// Chat lookups needed by the verifier.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Resolves a handle or id into the chat it names.
    async fn get_chat(&self, chat: &ChatRef) -> Result<ResolvedChat, TransportFailure>;

    /// Membership of `user_id` (the bot) in `chat_id`.
    async fn get_chat_member(&self, chat_id: i64, user_id: u64) -> Result<ChatMemberInfo, TransportFailure>;
}

/// Outcome of a successful verification query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub chat: ResolvedChat,
    pub is_admin: bool,
    pub permissions: BTreeSet<PermissionFlag>,
}

impl VerificationResult {
    pub fn has(&self, flag: PermissionFlag) -> bool {
        self.permissions.contains(&flag)
    }
}

/// Verification failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifyError {
    /// Bot has no access or the chat does not exist; the user must send something else
    #[error("chat unreachable: {0}")]
    ChatUnreachable(String),

    /// Transient failure; the same input may work on a retry
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<TransportFailure> for VerifyError {
    fn from(failure: TransportFailure) -> Self {
        match failure {
            TransportFailure::NotFound(reason) => VerifyError::ChatUnreachable(reason),
            TransportFailure::Network(reason) => VerifyError::Transport(reason),
        }
    }
}

/// Checks whether the bot holds admin rights in a referenced chat.
///
/// Does not retry. A forwarded reference is already resolved by its origin
/// metadata, so only the membership query goes out for it.
#[derive(Clone)]
pub struct ChatAdminVerifier {
    transport: Arc<dyn ChatTransport>,
    bot_id: u64,
}

impl ChatAdminVerifier {
    pub fn new(transport: Arc<dyn ChatTransport>, bot_id: u64) -> Self {
        Self { transport, bot_id }
    }

    pub fn bot_id(&self) -> u64 {
        self.bot_id
    }

    pub async fn verify(&self, chat_ref: &ChatRef) -> Result<VerificationResult, VerifyError> {
        let chat = match chat_ref {
            ChatRef::Forwarded(origin) => ResolvedChat::from(origin.clone()),
            ChatRef::Handle(_) | ChatRef::Id(_) => self.transport.get_chat(chat_ref).await?,
        };

        let member = self.transport.get_chat_member(chat.id, self.bot_id).await?;

        log::debug!(
            "Verified {} ({}): bot status {}, {} permission(s)",
            chat_ref,
            chat.id,
            member.status,
            member.permissions.len()
        );

        Ok(VerificationResult {
            chat,
            is_admin: member.status.is_admin(),
            permissions: member.permissions,
        })
    }
}
