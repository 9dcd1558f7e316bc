//! [`ChatTransport`] backed by the Telegram Bot API.

use async_trait::async_trait;
use std::collections::BTreeSet;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberKind, Recipient};
use teloxide::RequestError;

use portalcore::wizard::{
    ChatMemberInfo, ChatRef, ChatTransport, MemberStatus, PermissionFlag, ResolvedChat, TransportFailure,
};

use super::input::chat_kind;

/// Resolves chats and the bot's membership through `getChat` and
/// `getChatMember`.
#[derive(Clone)]
pub struct TeloxideTransport {
    bot: Bot,
}

impl TeloxideTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TeloxideTransport {
    async fn get_chat(&self, chat: &ChatRef) -> Result<ResolvedChat, TransportFailure> {
        let info = self.bot.get_chat(recipient_for(chat)).await.map_err(map_request_error)?;

        Ok(ResolvedChat {
            id: info.id.0,
            kind: chat_kind(info.is_channel(), info.is_supergroup(), info.is_group()),
            title: info.title().map(str::to_string),
            username: info.username().map(str::to_string),
        })
    }

    async fn get_chat_member(&self, chat_id: i64, user_id: u64) -> Result<ChatMemberInfo, TransportFailure> {
        let member = self
            .bot
            .get_chat_member(ChatId(chat_id), UserId(user_id))
            .await
            .map_err(map_request_error)?;

        Ok(ChatMemberInfo {
            status: member_status(&member.kind),
            permissions: permissions_of(&member.kind),
        })
    }
}

/// Bot API recipient for a chat reference.
pub fn recipient_for(chat: &ChatRef) -> Recipient {
    match chat {
        ChatRef::Forwarded(origin) => Recipient::Id(ChatId(origin.id)),
        ChatRef::Handle(handle) => Recipient::ChannelUsername(format!("@{}", handle)),
        ChatRef::Id(id) => Recipient::Id(ChatId(*id)),
    }
}

/// API errors mean the chat is missing or closed to the bot; everything else
/// is a transient transport problem.
pub fn map_request_error(err: RequestError) -> TransportFailure {
    match err {
        RequestError::Api(api) => TransportFailure::NotFound(api.to_string()),
        RequestError::MigrateToChatId(new_id) => {
            TransportFailure::NotFound(format!("group was upgraded to supergroup {}", new_id))
        }
        other => TransportFailure::Network(other.to_string()),
    }
}

fn member_status(kind: &ChatMemberKind) -> MemberStatus {
    if kind.is_owner() {
        MemberStatus::Owner
    } else if kind.is_administrator() {
        MemberStatus::Administrator
    } else if kind.is_restricted() {
        MemberStatus::Restricted
    } else if kind.is_left() {
        MemberStatus::Left
    } else if kind.is_banned() {
        MemberStatus::Banned
    } else {
        MemberStatus::Member
    }
}

fn permissions_of(kind: &ChatMemberKind) -> BTreeSet<PermissionFlag> {
    if !kind.is_privileged() {
        return BTreeSet::new();
    }

    [
        (PermissionFlag::ManageChat, kind.can_manage_chat()),
        (PermissionFlag::ChangeInfo, kind.can_change_info()),
        (PermissionFlag::PostMessages, kind.can_post_messages()),
        (PermissionFlag::DeleteMessages, kind.can_delete_messages()),
        (PermissionFlag::InviteUsers, kind.can_invite_users()),
        (PermissionFlag::RestrictMembers, kind.can_restrict_members()),
        (PermissionFlag::PinMessages, kind.can_pin_messages()),
        (PermissionFlag::PromoteMembers, kind.can_promote_members()),
    ]
    .into_iter()
    .filter_map(|(flag, granted)| granted.then_some(flag))
    .collect()
}
