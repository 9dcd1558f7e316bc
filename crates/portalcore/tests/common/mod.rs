//! Common test utilities
//!
//! Fakes for the wizard's collaborators, shared across integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use portalcore::storage::InMemoryPortalStore;
use portalcore::wizard::{
    ChatAdminVerifier, ChatKind, ChatMemberInfo, ChatRef, ChatTransport, MemberStatus, PermissionFlag, ResolvedChat,
    SessionStore, TransportFailure, WizardConfig, WizardOrchestrator,
};
use portalcore::PortalStore;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub const BOT_ID: u64 = 777_000;

/// Holds a transport call until the test releases it.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

/// Transport answering from fixed tables.
///
/// Chats are keyed by the reference as the user typed it (`@handle` or the
/// numeric id). Unknown chats are `NotFound`; unknown memberships are plain
/// members without rights.
#[derive(Default)]
pub struct ScriptedTransport {
    chats: HashMap<String, Result<ResolvedChat, TransportFailure>>,
    members: Mutex<HashMap<i64, Result<ChatMemberInfo, TransportFailure>>>,
    gate: Mutex<Option<Arc<Gate>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `chat` under `key` and makes the bot an admin there with
    /// `permissions`.
    pub fn with_admin_chat(self, key: &str, chat: ResolvedChat, permissions: &[PermissionFlag]) -> Self {
        let id = chat.id;
        self.with_chat(key, chat).with_member(id, MemberStatus::Administrator, permissions)
    }

    pub fn with_chat(mut self, key: &str, chat: ResolvedChat) -> Self {
        self.chats.insert(key.to_string(), Ok(chat));
        self
    }

    pub fn with_chat_failure(mut self, key: &str, failure: TransportFailure) -> Self {
        self.chats.insert(key.to_string(), Err(failure));
        self
    }

    pub fn with_member(self, chat_id: i64, status: MemberStatus, permissions: &[PermissionFlag]) -> Self {
        self.set_member(chat_id, status, permissions);
        self
    }

    /// Changes the bot's membership in `chat_id`, e.g. after the user
    /// promotes it.
    pub fn set_member(&self, chat_id: i64, status: MemberStatus, permissions: &[PermissionFlag]) {
        self.members.lock().unwrap().insert(
            chat_id,
            Ok(ChatMemberInfo {
                status,
                permissions: permissions.iter().copied().collect::<BTreeSet<_>>(),
            }),
        );
    }

    /// The next `get_chat` call blocks on `gate`.
    pub fn with_gate(self, gate: Arc<Gate>) -> Self {
        *self.gate.lock().unwrap() = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn get_chat(&self, chat: &ChatRef) -> Result<ResolvedChat, TransportFailure> {
        let key = chat.to_string();
        self.calls.lock().unwrap().push(format!("get_chat {}", key));

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        self.chats
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Err(TransportFailure::NotFound(key)))
    }

    async fn get_chat_member(&self, chat_id: i64, user_id: u64) -> Result<ChatMemberInfo, TransportFailure> {
        assert_eq!(user_id, BOT_ID, "membership must be queried for the bot itself");
        self.calls.lock().unwrap().push(format!("get_chat_member {}", chat_id));

        self.members.lock().unwrap().get(&chat_id).cloned().unwrap_or_else(|| {
            Ok(ChatMemberInfo {
                status: MemberStatus::Member,
                permissions: BTreeSet::new(),
            })
        })
    }
}

pub fn channel(id: i64, username: &str, title: &str) -> ResolvedChat {
    ResolvedChat {
        id,
        kind: ChatKind::Channel,
        title: Some(title.to_string()),
        username: Some(username.to_string()),
    }
}

pub fn supergroup(id: i64, username: Option<&str>, title: &str) -> ResolvedChat {
    ResolvedChat {
        id,
        kind: ChatKind::Supergroup,
        title: Some(title.to_string()),
        username: username.map(str::to_string),
    }
}

/// The chats used by the happy-path scenario: `@mychannel` and `@mygroup`
/// with the bot as a fully privileged admin in both.
pub fn standard_transport() -> ScriptedTransport {
    ScriptedTransport::new()
        .with_admin_chat(
            "@mychannel",
            channel(-1001000000001, "mychannel", "My Channel"),
            &[PermissionFlag::PostMessages, PermissionFlag::InviteUsers],
        )
        .with_admin_chat(
            "@mygroup",
            supergroup(-1001000000002, Some("mygroup"), "My Group"),
            &[PermissionFlag::InviteUsers, PermissionFlag::PinMessages],
        )
}

/// Builds an orchestrator over `transport` and `store`.
pub fn orchestrator_with(
    transport: Arc<ScriptedTransport>,
    store: Arc<dyn PortalStore>,
    timeout: Duration,
) -> Arc<WizardOrchestrator> {
    let verifier = ChatAdminVerifier::new(transport as Arc<dyn ChatTransport>, BOT_ID);
    Arc::new(WizardOrchestrator::new(
        Arc::new(SessionStore::new()),
        verifier,
        store,
        WizardConfig::builder().session_timeout(timeout).build(),
    ))
}

/// Orchestrator wired to `transport` and an in-memory portal store.
pub struct TestWizard {
    pub orchestrator: Arc<WizardOrchestrator>,
    pub portals: Arc<InMemoryPortalStore>,
    pub transport: Arc<ScriptedTransport>,
}

impl TestWizard {
    pub fn new(transport: ScriptedTransport) -> Self {
        Self::with_timeout(transport, Duration::from_secs(600))
    }

    pub fn with_timeout(transport: ScriptedTransport, timeout: Duration) -> Self {
        Self::build(transport, InMemoryPortalStore::new(), timeout)
    }

    /// Every `create_portal` call fails.
    pub fn with_failing_store(transport: ScriptedTransport) -> Self {
        Self::build(transport, InMemoryPortalStore::failing(), Duration::from_secs(600))
    }

    fn build(transport: ScriptedTransport, portals: InMemoryPortalStore, timeout: Duration) -> Self {
        let transport = Arc::new(transport);
        let portals = Arc::new(portals);
        let orchestrator = orchestrator_with(
            Arc::clone(&transport),
            Arc::clone(&portals) as Arc<dyn PortalStore>,
            timeout,
        );

        Self {
            orchestrator,
            portals,
            transport,
        }
    }
}
