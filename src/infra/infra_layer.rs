// The infra module contains implementations of core-facing concerns that
// are not Discord specific.

#[path = "config/json_config.rs"]
pub mod config;
