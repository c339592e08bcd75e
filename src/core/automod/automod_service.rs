// Auto-moderation pipeline - core business logic for the word filter and
// spam detection.
//
// The pipeline decides, for each inbound message, whether to take an
// automated action:
// - Exemption gate (bots, DMs, moderators pass untouched)
// - Word filter (first configured match wins, short-circuits spam tracking)
// - Spam detection (identical-message count over a sliding window)
//
// NO Discord dependencies here - side effects go through the
// `ModerationActuator` port, implemented by the Discord layer.

use super::automod_models::{AutoModAction, AutoModConfig, MessageEvent};
use super::rate_window::RateWindowTracker;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// How long transient automod notices stay in the channel.
const NOTICE_DELETE_DELAY: Duration = Duration::from_secs(5);

/// Timeout applied to an author who tripped the spam threshold.
const SPAM_TIMEOUT_DURATION: Duration = Duration::from_secs(5 * 60);

/// Extra messages purged beyond the threshold when spam fires.
const SPAM_PURGE_MARGIN: u32 = 5;

// ============================================================================
// ERRORS
// ============================================================================

/// Failures an actuator call can report.
///
/// Both variants are recovered locally: the pipeline logs and moves on to
/// the next independent side effect. Nothing here ever reaches the caller.
#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("missing permissions")]
    PermissionDenied,

    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// ACTUATOR TRAIT (PORT)
// ============================================================================

/// Moderation side effects the pipeline can request from its environment.
///
/// Core defines the contract; the Discord layer implements it over serenity.
#[async_trait]
pub trait ModerationActuator: Send + Sync {
    /// Delete a single message.
    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), ActuatorError>;

    /// Delete up to `limit` of the author's most recent messages in the
    /// channel. Returns the ids that were actually deleted.
    async fn purge_author_messages(
        &self,
        channel_id: u64,
        author_id: u64,
        limit: u32,
    ) -> Result<Vec<u64>, ActuatorError>;

    /// Temporarily mute a member.
    async fn timeout_member(
        &self,
        guild_id: u64,
        user_id: u64,
        duration: Duration,
        reason: &str,
    ) -> Result<(), ActuatorError>;

    /// Post a notice mentioning `user_id`, removed again after
    /// `delete_after`. The delayed removal is fire-and-forget.
    async fn send_temporary_notice(
        &self,
        channel_id: u64,
        user_id: u64,
        text: &str,
        delete_after: Duration,
    ) -> Result<(), ActuatorError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Auto-moderation service: word filter plus spam detection over a
/// per-author sliding window.
pub struct AutoModService<A: ModerationActuator> {
    tracker: RateWindowTracker,
    actuator: A,
}

impl<A: ModerationActuator> AutoModService<A> {
    /// Create a new service with the given actuator.
    pub fn new(actuator: A) -> Self {
        Self {
            tracker: RateWindowTracker::new(),
            actuator,
        }
    }

    /// Run the full pipeline for one inbound message.
    ///
    /// `now` is monotonic seconds from the caller's clock; `config` is an
    /// immutable snapshot for this invocation. Side effects are executed
    /// before returning, each best-effort: failures are logged, never
    /// propagated.
    pub async fn handle_message(
        &self,
        event: &MessageEvent,
        config: &AutoModConfig,
        now: f64,
    ) -> AutoModAction {
        // --- Exemption gate ---------------------------------------------
        // Moderators' messages never enter the tracker at all.
        let guild_id = match event.guild_id {
            Some(id) => id,
            None => return AutoModAction::None,
        };
        if event.author_is_bot || event.author_permissions.is_moderator() {
            return AutoModAction::None;
        }

        // --- Word filter ------------------------------------------------
        if let Some(word) = find_filter_word(&config.word_filter, &event.content) {
            self.apply_word_filter_action(event).await;
            return AutoModAction::WordFilter {
                matched_word: word.to_string(),
            };
        }

        // --- Spam detection ---------------------------------------------
        // Prune with the old window before recording, so the new message
        // can never be pruned by its own arrival.
        let cutoff = now - config.spam_interval_secs as f64;
        self.tracker.prune(guild_id, event.author_id, cutoff);
        self.tracker
            .record(guild_id, event.author_id, &event.content, now);

        let identical = self
            .tracker
            .identical_count(guild_id, event.author_id, &event.content);

        if identical >= config.spam_threshold as usize {
            self.apply_spam_action(event, guild_id, config).await;
            // Reset only once the action is committed, so the same burst
            // cannot retrigger before new messages accumulate.
            self.tracker.reset(guild_id, event.author_id);
            return AutoModAction::Spam;
        }

        AutoModAction::None
    }

    /// Delete the filtered message and post a transient notice.
    ///
    /// If the delete fails the pipeline stops here - no notice is sent for
    /// a message we could not remove.
    async fn apply_word_filter_action(&self, event: &MessageEvent) {
        if let Err(e) = self
            .actuator
            .delete_message(event.channel_id, event.message_id)
            .await
        {
            tracing::warn!(
                message_id = event.message_id,
                channel_id = event.channel_id,
                "Failed to delete filtered message: {}",
                e
            );
            return;
        }

        let text = format!(
            "<@{}>, your message was removed for containing a filtered word.",
            event.author_id
        );
        if let Err(e) = self
            .actuator
            .send_temporary_notice(event.channel_id, event.author_id, &text, NOTICE_DELETE_DELAY)
            .await
        {
            tracing::warn!("Failed to send word-filter notice: {}", e);
        }
    }

    /// Purge the burst, time the author out, and post a transient notice.
    ///
    /// The three side effects are independent: a failed purge does not
    /// prevent the timeout, and a failed timeout does not prevent the
    /// notice.
    async fn apply_spam_action(&self, event: &MessageEvent, guild_id: u64, config: &AutoModConfig) {
        let purge_limit = config.spam_threshold + SPAM_PURGE_MARGIN;
        if let Err(e) = self
            .actuator
            .purge_author_messages(event.channel_id, event.author_id, purge_limit)
            .await
        {
            tracing::warn!(
                author_id = event.author_id,
                channel_id = event.channel_id,
                "Failed to purge spam messages: {}",
                e
            );
        }

        if let Err(e) = self
            .actuator
            .timeout_member(
                guild_id,
                event.author_id,
                SPAM_TIMEOUT_DURATION,
                "Auto-moderation: spam detected",
            )
            .await
        {
            tracing::warn!(
                author_id = event.author_id,
                guild_id = guild_id,
                "Failed to timeout spamming member: {}",
                e
            );
        }

        let text = format!(
            "<@{}> has been timed out for **{} minutes** for sending repeated messages.",
            event.author_id,
            SPAM_TIMEOUT_DURATION.as_secs() / 60
        );
        if let Err(e) = self
            .actuator
            .send_temporary_notice(event.channel_id, event.author_id, &text, NOTICE_DELETE_DELAY)
            .await
        {
            tracing::warn!("Failed to send spam notice: {}", e);
        }
    }
}

/// Return the first configured word found in `content`, case-insensitively.
///
/// The configured word is reported, not the matched slice, so the caller
/// sees the filter entry in its configured spelling.
fn find_filter_word<'a>(word_filter: &'a [String], content: &str) -> Option<&'a str> {
    if word_filter.is_empty() {
        return None;
    }
    let content_lower = content.to_lowercase();
    word_filter
        .iter()
        // An empty filter entry would match every message
        .filter(|word| !word.is_empty())
        .find(|word| content_lower.contains(&word.to_lowercase()))
        .map(String::as_str)
}

// ============================================================================
// TESTS
// ============================================================================
