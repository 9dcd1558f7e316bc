//! Drives wizard sessions from incoming user messages.
//!
//! The orchestrator is the only place that mutates sessions. It classifies
//! input, calls the verifier, applies the resulting transition and persists
//! the portal once all three steps are done.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use super::classifier::{classify, Classified};
use super::prompt::Prompt;
use super::session::{Transition, WizardSession, WizardStep};
use super::store::{ExpiryNotice, SessionHandle, SessionStore};
use super::types::{IncomingMessage, OwnerId};
use super::verifier::ChatAdminVerifier;
use crate::core::config;
use crate::storage::portals::PortalStore;

/// Runtime settings for the wizard.
#[derive(Debug, Clone, bon::Builder)]
pub struct WizardConfig {
    /// Idle time after which a session is swept
    #[builder(default = config::wizard::session_timeout())]
    pub session_timeout: Duration,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// What the caller should do with a message it handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Send this prompt back to the user
    Reply(Prompt),
    /// The session was replaced or removed while the message was being
    /// processed; send nothing
    Discarded,
    /// The user has no wizard in progress; route the message elsewhere
    NoSession,
}

impl Dispatch {
    pub fn prompt(&self) -> Option<&Prompt> {
        match self {
            Dispatch::Reply(prompt) => Some(prompt),
            _ => None,
        }
    }

    pub fn into_prompt(self) -> Option<Prompt> {
        match self {
            Dispatch::Reply(prompt) => Some(prompt),
            _ => None,
        }
    }
}

pub struct WizardOrchestrator {
    store: Arc<SessionStore>,
    verifier: ChatAdminVerifier,
    portals: Arc<dyn PortalStore>,
    config: WizardConfig,
}

impl WizardOrchestrator {
    pub fn new(
        store: Arc<SessionStore>,
        verifier: ChatAdminVerifier,
        portals: Arc<dyn PortalStore>,
        config: WizardConfig,
    ) -> Self {
        Self {
            store,
            verifier,
            portals,
            config,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn has_session(&self, owner_id: OwnerId) -> bool {
        self.store.contains(owner_id)
    }

    /// Starts a new setup for `owner_id`, discarding any session in progress.
    pub fn handle_entry(&self, owner_id: OwnerId) -> Prompt {
        let (_, previous) = self.store.put(WizardSession::new(owner_id, Utc::now()));

        if let Some(previous) = previous {
            // A locked session is mid-verification; its handler sees that it
            // is no longer current and drops the result.
            if let Ok(mut session) = previous.try_lock() {
                session.abort();
            }
            log::info!("Restarted portal setup for user {}", owner_id);
        } else {
            log::info!("Started portal setup for user {}", owner_id);
        }

        Prompt::Step {
            step: WizardStep::AwaitingChannel,
            verified: None,
        }
    }

    /// Aborts the user's session. Waits for any message of that user that is
    /// still being processed.
    pub async fn handle_cancel(&self, owner_id: OwnerId) -> Dispatch {
        let Some(handle) = self.store.get(owner_id) else {
            return Dispatch::NoSession;
        };

        let mut session = handle.lock().await;
        let step = session.step();
        let aborted = session.abort();
        drop(session);

        self.store.remove_if_current(owner_id, &handle);

        if aborted {
            log::info!("User {} cancelled portal setup at step {}", owner_id, step);
            Dispatch::Reply(Prompt::Cancelled)
        } else {
            Dispatch::NoSession
        }
    }

    /// Feeds one message into the user's session.
    pub async fn handle_message(&self, owner_id: OwnerId, message: &IncomingMessage) -> Dispatch {
        if message.is_command(config::wizard::CANCEL_COMMAND) {
            return self.handle_cancel(owner_id).await;
        }

        let Some(handle) = self.store.get(owner_id) else {
            return Dispatch::NoSession;
        };

        let mut session = handle.lock().await;

        if !self.store.is_current(owner_id, &handle) {
            log::debug!("Dropping message of user {}: session replaced while waiting", owner_id);
            return Dispatch::Discarded;
        }
        if session.step().is_terminal() {
            return Dispatch::NoSession;
        }

        let now = Utc::now();
        if session.is_expired(now, self.timeout()) {
            let step = session.step();
            session.abort();
            drop(session);
            self.store.remove_if_current(owner_id, &handle);
            log::info!("Wizard session of user {} expired at step {}", owner_id, step);
            return Dispatch::Reply(Prompt::Expired);
        }

        match session.step() {
            WizardStep::AwaitingChannel | WizardStep::AwaitingGroup => {
                self.handle_chat_step(owner_id, &handle, &mut session, message).await
            }
            WizardStep::AwaitingWelcome => self.handle_welcome_step(owner_id, &handle, &mut session, message).await,
            _ => Dispatch::NoSession,
        }
    }

    /// Aborts and removes sessions idle past the configured timeout.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Vec<ExpiryNotice> {
        self.store.sweep(now, self.config.session_timeout)
    }

    async fn handle_chat_step(
        &self,
        owner_id: OwnerId,
        handle: &SessionHandle,
        session: &mut WizardSession,
        message: &IncomingMessage,
    ) -> Dispatch {
        let step = session.step();

        let chat_ref = match classify(message) {
            Classified::Chat(chat_ref) => chat_ref,
            Classified::Unrecognized => {
                log::debug!("Unrecognized input from user {} at step {}", owner_id, step);
                return self.reply_for(owner_id, session.reject_input(Utc::now()));
            }
        };

        let outcome = self.verifier.verify(&chat_ref).await;

        if !self.store.is_current(owner_id, handle) {
            log::info!(
                "Discarding verification of {} for user {}: session was replaced",
                chat_ref,
                owner_id
            );
            return Dispatch::Discarded;
        }

        if let Err(e) = &outcome {
            log::warn!("Verification of {} failed for user {}: {}", chat_ref, owner_id, e);
        }

        self.reply_for(owner_id, session.accept_chat(outcome, Utc::now()))
    }

    async fn handle_welcome_step(
        &self,
        owner_id: OwnerId,
        handle: &SessionHandle,
        session: &mut WizardSession,
        message: &IncomingMessage,
    ) -> Dispatch {
        let text = if message.is_command(config::wizard::SKIP_COMMAND) {
            None
        } else {
            match message.text.as_deref() {
                Some(text) => Some(text),
                None => {
                    log::debug!("Non-text welcome message from user {}", owner_id);
                    return self.reply_for(owner_id, session.reject_input(Utc::now()));
                }
            }
        };

        let portal = match session.accept_welcome(text, Utc::now()) {
            Transition::Finished(portal) => portal,
            other => return self.reply_for(owner_id, other),
        };

        let result = self.portals.create_portal(portal.clone()).await;
        self.store.remove_if_current(owner_id, handle);

        match result {
            Ok(portal_id) => {
                log::info!(
                    "Portal {} created by user {}: channel {} -> group {}",
                    portal_id,
                    owner_id,
                    portal.channel.id,
                    portal.group.id
                );
                Dispatch::Reply(Prompt::Completed {
                    portal_id,
                    channel: portal.channel,
                    group: portal.group,
                    welcome_text: portal.welcome_text,
                })
            }
            Err(e) => {
                session.mark_persist_failed();
                log::error!("Failed to persist portal for user {}: {}", owner_id, e);
                Dispatch::Reply(Prompt::PersistFailed)
            }
        }
    }

    fn reply_for(&self, owner_id: OwnerId, transition: Transition) -> Dispatch {
        match transition {
            Transition::Advanced { to, verified } => {
                log::info!(
                    "User {} advanced to step {} after verifying {}",
                    owner_id,
                    to,
                    verified.display_name()
                );
                Dispatch::Reply(Prompt::Step {
                    step: to,
                    verified: Some(verified),
                })
            }
            Transition::Stayed { step, error } => {
                log::info!("User {} stays at step {}: {}", owner_id, step, error);
                Dispatch::Reply(Prompt::Rejected { step, error })
            }
            // Persisting is handled by the welcome step itself
            Transition::Finished(_) | Transition::Ignored => Dispatch::NoSession,
        }
    }

    fn timeout(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.config.session_timeout).unwrap_or(chrono::Duration::MAX)
    }
}
