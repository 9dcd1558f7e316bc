//! Telegram messages driven through the wizard.
//!
//! Messages are deserialized from Bot API JSON, converted with the same
//! helpers the dispatcher uses and fed to a real orchestrator.

mod common;

use common::{forwarded_channel_message, text_message, AdminEverywhere, TEST_USER_ID};
use portalbot::telegram::input::{claimed_by_wizard, incoming_message, owner_id};
use portalcore::storage::InMemoryPortalStore;
use portalcore::wizard::{
    ChatAdminVerifier, Dispatch, OwnerId, Prompt, SessionStore, WizardConfig, WizardOrchestrator, WizardStep,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn orchestrator(portals: Arc<InMemoryPortalStore>) -> WizardOrchestrator {
    WizardOrchestrator::new(
        Arc::new(SessionStore::new()),
        ChatAdminVerifier::new(Arc::new(AdminEverywhere), 1),
        portals,
        WizardConfig::default(),
    )
}

async fn send(wizard: &WizardOrchestrator, msg: &teloxide::types::Message) -> Dispatch {
    let owner = owner_id(msg).unwrap();
    let incoming = incoming_message(msg);
    assert!(claimed_by_wizard(&incoming), "message should go to the wizard");
    wizard.handle_message(owner, &incoming).await
}

#[tokio::test]
async fn test_forwarded_channel_then_group_id() {
    let portals = Arc::new(InMemoryPortalStore::new());
    let wizard = orchestrator(Arc::clone(&portals));
    let owner = OwnerId(TEST_USER_ID);

    wizard.handle_entry(owner);

    let dispatch = send(&wizard, &forwarded_channel_message(TEST_USER_ID, -1001234, "Forwarded News")).await;
    let Some(Prompt::Step {
        step: WizardStep::AwaitingGroup,
        verified: Some(channel),
    }) = dispatch.prompt()
    else {
        panic!("expected step 2, got {:?}", dispatch);
    };
    assert_eq!(channel.id, -1001234);
    assert_eq!(channel.title.as_deref(), Some("Forwarded News"));

    let dispatch = send(&wizard, &text_message(TEST_USER_ID, "-1009999")).await;
    assert_eq!(dispatch.prompt().and_then(Prompt::step_number), Some(3));

    let dispatch = send(&wizard, &text_message(TEST_USER_ID, "/skip@portalbot")).await;
    assert!(matches!(dispatch.prompt(), Some(Prompt::Completed { .. })));

    let stored = portals.all();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].channel.id, -1001234);
    assert_eq!(stored[0].group.id, -1009999);
    assert_eq!(stored[0].created_by, owner);
}

#[tokio::test]
async fn test_handles_and_cancel() {
    let portals = Arc::new(InMemoryPortalStore::new());
    let wizard = orchestrator(Arc::clone(&portals));
    let owner = OwnerId(TEST_USER_ID);

    wizard.handle_entry(owner);
    send(&wizard, &text_message(TEST_USER_ID, "@mychannel")).await;
    let dispatch = send(&wizard, &text_message(TEST_USER_ID, "@mygroup")).await;
    assert_eq!(dispatch.prompt().and_then(Prompt::step_number), Some(3));

    let dispatch = send(&wizard, &text_message(TEST_USER_ID, "/cancel")).await;
    assert_eq!(dispatch, Dispatch::Reply(Prompt::Cancelled));
    assert!(!wizard.has_session(owner));
    assert!(portals.all().is_empty());
}

#[test]
fn test_other_commands_bypass_the_wizard() {
    for text in ["/help", "/portal list", "/start"] {
        let incoming = incoming_message(&text_message(TEST_USER_ID, text));
        assert!(!claimed_by_wizard(&incoming), "{} must reach the command handler", text);
    }
}
