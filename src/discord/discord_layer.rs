// Discord layer - commands and event handlers.

#[path = "moderation/mod.rs"]
pub mod moderation;

// Re-export framework types for convenience
pub use moderation::commands::{Data, Error};
