// Auto-moderation domain models - data structures for the automod pipeline.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer builds a `MessageEvent` snapshot from a gateway message
// and translates the resulting `AutoModAction` back into Discord terms.

use serde::Deserialize;

/// What the pipeline decided for a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoModAction {
    /// Nothing to do - message is clean or the author is exempt
    None,
    /// A configured filter word was found in the message
    WordFilter { matched_word: String },
    /// The author crossed the identical-message threshold
    Spam,
}

/// Permission flags of the message author, as seen at delivery time.
///
/// Any flag set means the author is a moderator and exempt from automod.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorPermissions {
    pub manage_messages: bool,
    pub kick_members: bool,
    pub ban_members: bool,
}

impl AuthorPermissions {
    /// True if the author holds at least one moderation permission.
    pub fn is_moderator(&self) -> bool {
        self.manage_messages || self.kick_members || self.ban_members
    }
}

/// Snapshot of an inbound message, reduced to what the pipeline needs.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    /// `None` for direct messages
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub message_id: u64,
    pub author_id: u64,
    pub author_is_bot: bool,
    pub author_permissions: AuthorPermissions,
    pub content: String,
}

/// Runtime configuration for the automod pipeline.
///
/// Loaded from the JSON config file; treated as an immutable snapshot for
/// each message check.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutoModConfig {
    /// Filter words, matched case-insensitively as substrings, in order
    pub word_filter: Vec<String>,
    /// Identical messages within the window that trigger a spam action
    pub spam_threshold: u32,
    /// Trailing window in seconds for identical-message counting
    #[serde(rename = "spam_interval")]
    pub spam_interval_secs: u64,
}

impl Default for AutoModConfig {
    fn default() -> Self {
        Self {
            word_filter: Vec::new(),
            spam_threshold: 5,
            spam_interval_secs: 10,
        }
    }
}
