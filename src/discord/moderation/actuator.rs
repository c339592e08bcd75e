// Serenity-backed implementation of the core `ModerationActuator` port.
//
// All methods are plain REST calls; the pipeline treats every one of them
// as best-effort, so the only job here is to do the call and classify the
// failure.

use crate::core::automod::{ActuatorError, ModerationActuator};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;

/// Actuator over Discord's REST API.
pub struct SerenityActuator {
    http: Arc<serenity::Http>,
}

impl SerenityActuator {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

/// Map a serenity error onto the core taxonomy: HTTP 403 means the bot
/// lacks a permission, anything else is a transport failure.
fn classify(err: serenity::Error) -> ActuatorError {
    if let serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(ref resp)) = err {
        if resp.status_code.as_u16() == 403 {
            return ActuatorError::PermissionDenied;
        }
    }
    ActuatorError::Transport(err.to_string())
}

#[async_trait]
impl ModerationActuator for SerenityActuator {
    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), ActuatorError> {
        serenity::ChannelId::new(channel_id)
            .delete_message(&self.http, serenity::MessageId::new(message_id))
            .await
            .map_err(classify)
    }

    async fn purge_author_messages(
        &self,
        channel_id: u64,
        author_id: u64,
        limit: u32,
    ) -> Result<Vec<u64>, ActuatorError> {
        let channel = serenity::ChannelId::new(channel_id);

        // Scan the most recent window of the channel and pick out the
        // author's messages; bulk delete handles 2..=100 ids.
        let recent = channel
            .messages(&self.http, serenity::GetMessages::new().limit(100))
            .await
            .map_err(classify)?;

        let targets: Vec<serenity::MessageId> = recent
            .iter()
            .filter(|m| m.author.id.get() == author_id)
            .take(limit as usize)
            .map(|m| m.id)
            .collect();

        let deleted: Vec<u64> = targets.iter().map(|id| id.get()).collect();
        match targets.len() {
            0 => {}
            1 => channel
                .delete_message(&self.http, targets[0])
                .await
                .map_err(classify)?,
            _ => channel
                .delete_messages(&self.http, targets)
                .await
                .map_err(classify)?,
        }

        Ok(deleted)
    }

    async fn timeout_member(
        &self,
        guild_id: u64,
        user_id: u64,
        duration: Duration,
        reason: &str,
    ) -> Result<(), ActuatorError> {
        let until = chrono::Utc::now().timestamp() + duration.as_secs() as i64;
        let timestamp = serenity::Timestamp::from_unix_timestamp(until)
            .map_err(|e| ActuatorError::Transport(e.to_string()))?;

        serenity::GuildId::new(guild_id)
            .edit_member(
                &self.http,
                serenity::UserId::new(user_id),
                serenity::EditMember::new()
                    .disable_communication_until_datetime(timestamp)
                    .audit_log_reason(reason),
            )
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn send_temporary_notice(
        &self,
        channel_id: u64,
        _user_id: u64,
        text: &str,
        delete_after: Duration,
    ) -> Result<(), ActuatorError> {
        let channel = serenity::ChannelId::new(channel_id);
        let notice = channel.say(&self.http, text).await.map_err(classify)?;

        // Fire-and-forget removal; if the process dies first, the notice
        // simply stays.
        let http = Arc::clone(&self.http);
        tokio::spawn(async move {
            tokio::time::sleep(delete_after).await;
            if let Err(e) = notice.delete(&http).await {
                tracing::debug!("Failed to remove transient notice: {}", e);
            }
        });

        Ok(())
    }
}
