//! Relays contact form submissions to a Telegram chat.
//!
//! A single `POST /api/send` endpoint identifies the caller, applies a
//! per-client fixed-window rate limit, checks an optional shared secret,
//! validates and sanitizes the payload, and forwards it through the
//! Telegram Bot API `sendMessage` method.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod relay;
pub mod state;
pub mod telegram;

pub use config::{Args, ConfigError, RelayConfig};
pub use error::RelayError;
pub use handlers::router;
pub use rate_limit::{Clock, ManualClock, RateLimitResult, RateLimiter, SystemClock};
pub use state::AppState;
pub use telegram::{TelegramClient, TelegramError};
