// Core automod module - word filter and spam detection business logic.

pub mod automod_models;
pub mod automod_service;
pub mod clock;
pub mod rate_window;

pub use automod_models::*;
pub use automod_service::*;
pub use clock::MonotonicClock;
pub use rate_window::RateWindowTracker;
