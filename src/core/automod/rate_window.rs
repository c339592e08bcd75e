// Per-author sliding window of recent messages.
//
// This is the only stateful piece of the automod pipeline: a map from
// (guild, user) to the messages that author sent within the trailing spam
// window. Pure data structure - no I/O, no clock of its own.

use dashmap::DashMap;
use std::collections::VecDeque;

/// A composite key for the tracker.
/// We need both guild_id AND user_id since users can be in multiple guilds.
#[derive(Hash, Eq, PartialEq, Clone, Debug)]
struct TrackerKey {
    guild_id: u64,
    user_id: u64,
}

/// In-memory tracker of recent message contents per author.
///
/// Timestamps are monotonic seconds supplied by the caller and must be
/// non-decreasing per key, which keeps the oldest entries at the front of
/// each deque so pruning pops from the front.
///
/// DashMap's per-entry locks serialize access per key; the gateway delivers
/// message events for one author serially, so the prune -> record -> count
/// sequence in the pipeline never interleaves for the same key.
pub struct RateWindowTracker {
    entries: DashMap<TrackerKey, VecDeque<(String, f64)>>,
}

impl RateWindowTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Append a message for this author. Entries are created lazily.
    pub fn record(&self, guild_id: u64, user_id: u64, content: &str, now: f64) {
        self.entries
            .entry(TrackerKey { guild_id, user_id })
            .or_default()
            .push_back((content.to_string(), now));
    }

    /// Drop every stored entry with a timestamp older than `cutoff`.
    ///
    /// Entries emptied by pruning are removed from the map so authors who
    /// went quiet don't pin an empty deque forever.
    pub fn prune(&self, guild_id: u64, user_id: u64, cutoff: f64) {
        let key = TrackerKey { guild_id, user_id };

        let emptied = match self.entries.get_mut(&key) {
            Some(mut entry) => {
                while entry.front().is_some_and(|(_, t)| *t < cutoff) {
                    entry.pop_front();
                }
                entry.is_empty()
            }
            None => false,
        };

        if emptied {
            // Re-check under the removal lock; a record() may have landed.
            self.entries.remove_if(&key, |_, messages| messages.is_empty());
        }
    }

    /// How many stored messages from this author equal `content` exactly.
    ///
    /// Case-sensitive, no normalization - "Hello" and "hello" are distinct.
    pub fn identical_count(&self, guild_id: u64, user_id: u64, content: &str) -> usize {
        self.entries
            .get(&TrackerKey { guild_id, user_id })
            .map(|entry| entry.iter().filter(|(c, _)| c == content).count())
            .unwrap_or(0)
    }

    /// Discard all history for this author, e.g. after a spam action fired.
    pub fn reset(&self, guild_id: u64, user_id: u64) {
        self.entries.remove(&TrackerKey { guild_id, user_id });
    }

    /// Number of messages currently stored for this author.
    pub fn stored_count(&self, guild_id: u64, user_id: u64) -> usize {
        self.entries
            .get(&TrackerKey { guild_id, user_id })
            .map(|entry| entry.len())
            .unwrap_or(0)
    }
}

impl Default for RateWindowTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_count_identical() {
        let tracker = RateWindowTracker::new();

        tracker.record(1, 10, "hi", 0.0);
        tracker.record(1, 10, "bye", 1.0);
        tracker.record(1, 10, "hi", 2.0);

        assert_eq!(tracker.identical_count(1, 10, "hi"), 2);
        assert_eq!(tracker.identical_count(1, 10, "bye"), 1);
        assert_eq!(tracker.identical_count(1, 10, "nope"), 0);
    }

    #[test]
    fn count_is_case_sensitive() {
        let tracker = RateWindowTracker::new();

        tracker.record(1, 10, "Hello", 0.0);
        tracker.record(1, 10, "hello", 1.0);

        assert_eq!(tracker.identical_count(1, 10, "Hello"), 1);
        assert_eq!(tracker.identical_count(1, 10, "hello"), 1);
    }

    #[test]
    fn prune_drops_only_stale_entries() {
        let tracker = RateWindowTracker::new();

        tracker.record(1, 10, "a", 0.0);
        tracker.record(1, 10, "a", 4.9);
        tracker.record(1, 10, "a", 5.0);
        tracker.record(1, 10, "a", 8.0);

        tracker.prune(1, 10, 5.0);

        // Entries at exactly the cutoff survive
        assert_eq!(tracker.stored_count(1, 10), 2);
        assert_eq!(tracker.identical_count(1, 10, "a"), 2);
    }

    #[test]
    fn prune_to_empty_removes_the_entry() {
        let tracker = RateWindowTracker::new();

        tracker.record(1, 10, "hi", 0.0);
        tracker.prune(1, 10, 100.0);

        assert_eq!(tracker.stored_count(1, 10), 0);
        assert_eq!(tracker.identical_count(1, 10, "hi"), 0);
    }

    #[test]
    fn prune_on_unknown_key_is_a_no_op() {
        let tracker = RateWindowTracker::new();
        tracker.prune(1, 10, 5.0);
        assert_eq!(tracker.stored_count(1, 10), 0);
    }

    #[test]
    fn reset_discards_all_history() {
        let tracker = RateWindowTracker::new();

        tracker.record(1, 10, "hi", 0.0);
        tracker.record(1, 10, "hi", 1.0);
        tracker.reset(1, 10);

        assert_eq!(tracker.stored_count(1, 10), 0);
        assert_eq!(tracker.identical_count(1, 10, "hi"), 0);
    }

    #[test]
    fn keys_are_scoped_per_guild_and_user() {
        let tracker = RateWindowTracker::new();

        tracker.record(1, 10, "hi", 0.0);
        tracker.record(2, 10, "hi", 0.0);
        tracker.record(1, 11, "hi", 0.0);

        assert_eq!(tracker.identical_count(1, 10, "hi"), 1);

        tracker.reset(1, 10);
        assert_eq!(tracker.identical_count(2, 10, "hi"), 1);
        assert_eq!(tracker.identical_count(1, 11, "hi"), 1);
    }
}
