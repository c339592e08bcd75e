// Discord-facing moderation: the automod message handler, the serenity
// actuator behind the core port, and moderator slash commands.

pub mod actuator;
pub mod automod_handler;
pub mod commands;
