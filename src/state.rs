use std::sync::Arc;

use crate::config::RelayConfig;
use crate::rate_limit::RateLimiter;
use crate::telegram::TelegramClient;

// app's shared state
pub struct AppState {
    pub telegram: TelegramClient,
    pub rate_limiter: Arc<RateLimiter>, // shared with the sweeper task
    pub shared_secret: Option<String>,
}

impl AppState {
    pub fn new(config: &RelayConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            telegram: TelegramClient::new(config)?,
            rate_limiter: Arc::new(RateLimiter::new(
                config.rate_limit_per_window,
                config.window,
            )),
            shared_secret: config.shared_secret.clone(),
        })
    }
}
