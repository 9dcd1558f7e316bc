//! Common test utilities
//!
//! Telegram message fixtures and a fake chat transport.

#![allow(dead_code)]

use async_trait::async_trait;
use portalcore::wizard::{
    ChatKind, ChatMemberInfo, ChatRef, ChatTransport, MemberStatus, PermissionFlag, ResolvedChat, TransportFailure,
};
use serde_json::json;
use std::collections::BTreeSet;
use teloxide::types::Message;

pub const TEST_USER_ID: i64 = 123456789;

/// Build a private-chat message from `user_id` from JSON
pub fn create_message_json(user_id: i64, text: &str) -> serde_json::Value {
    json!({
        "message_id": 1,
        "date": 1234567890,
        "chat": {
            "id": user_id,
            "type": "private",
            "first_name": "Test"
        },
        "from": {
            "id": user_id,
            "is_bot": false,
            "first_name": "Test",
            "username": "testuser"
        },
        "text": text
    })
}

pub fn text_message(user_id: i64, text: &str) -> Message {
    serde_json::from_value(create_message_json(user_id, text)).unwrap()
}

/// A message forwarded from a channel post
pub fn forwarded_channel_message(user_id: i64, channel_id: i64, title: &str) -> Message {
    let mut value = create_message_json(user_id, "channel post");
    value["forward_origin"] = json!({
        "type": "channel",
        "date": 1234567000,
        "message_id": 10,
        "chat": {
            "id": channel_id,
            "type": "channel",
            "title": title
        }
    });
    serde_json::from_value(value).unwrap()
}

/// Every chat exists; ids below -2000 are supergroups, the rest channels.
/// The bot is a full admin everywhere.
pub struct AdminEverywhere;

#[async_trait]
impl ChatTransport for AdminEverywhere {
    async fn get_chat(&self, chat: &ChatRef) -> Result<ResolvedChat, TransportFailure> {
        match chat {
            ChatRef::Handle(handle) if handle.ends_with("group") => Ok(ResolvedChat {
                id: -3000,
                kind: ChatKind::Supergroup,
                title: Some("Group".to_string()),
                username: Some(handle.clone()),
            }),
            ChatRef::Handle(handle) => Ok(ResolvedChat {
                id: -1000,
                kind: ChatKind::Channel,
                title: Some("Channel".to_string()),
                username: Some(handle.clone()),
            }),
            ChatRef::Id(id) => Ok(ResolvedChat {
                id: *id,
                kind: if *id < -2000 { ChatKind::Supergroup } else { ChatKind::Channel },
                title: None,
                username: None,
            }),
            ChatRef::Forwarded(origin) => Err(TransportFailure::Network(format!(
                "forwarded chat {} must not be looked up",
                origin.id
            ))),
        }
    }

    async fn get_chat_member(&self, _chat_id: i64, _user_id: u64) -> Result<ChatMemberInfo, TransportFailure> {
        Ok(ChatMemberInfo {
            status: MemberStatus::Administrator,
            permissions: [PermissionFlag::InviteUsers, PermissionFlag::PostMessages]
                .into_iter()
                .collect::<BTreeSet<_>>(),
        })
    }
}
