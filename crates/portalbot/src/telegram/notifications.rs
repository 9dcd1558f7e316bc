//! Out-of-band messages to users.

use teloxide::prelude::*;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use portalcore::wizard::{ExpiryNotice, Prompt};

/// Sends a wizard prompt as plain text.
pub async fn send_prompt(bot: &Bot, chat_id: ChatId, prompt: &Prompt) -> Result<(), teloxide::RequestError> {
    bot.send_message(chat_id, prompt.render()).await?;
    Ok(())
}

/// Tells users whose setup was swept that it timed out.
///
/// Runs until the sweeper drops its sender.
pub fn start_expiry_notifier(bot: Bot, mut rx: mpsc::UnboundedReceiver<ExpiryNotice>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notice) = rx.recv().await {
            let chat_id = ChatId(notice.owner_id.0);
            if let Err(e) = send_prompt(&bot, chat_id, &Prompt::Expired).await {
                log::warn!(
                    "Failed to notify user {} about expired setup (step {}): {}",
                    notice.owner_id,
                    notice.step,
                    e
                );
            }
        }
        log::info!("Expiry notifier stopped");
    })
}
