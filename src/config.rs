use clap::Parser;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

// CLI argument structure, every flag falls back to an environment variable
#[derive(Parser, Debug, Clone)]
#[command(name = "telegram-relay")]
#[command(about = "Relays contact form messages to a Telegram chat")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    // Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    // Destination chat id (numeric id or @channel name)
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub chat_id: String,

    // Shared secret clients must send, compared verbatim; empty disables the check
    #[arg(long, env = "API_SECRET", default_value = "", hide_env_values = true)]
    pub api_secret: String,

    // Rate limit max requests per window per client
    #[arg(long, env = "RATE_LIMIT_PER_MIN", default_value_t = 30)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_WINDOW_SECS", default_value_t = 60)]
    pub rate_window: u64,

    // Timeout for the outbound Telegram call in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 10)]
    pub upstream_timeout: u64,

    // Telegram Bot API base url
    #[arg(long, env = "TELEGRAM_API_BASE", default_value = DEFAULT_API_BASE)]
    pub telegram_api_base: String,

    // Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("telegram bot token must not be empty")]
    MissingBotToken,
    #[error("telegram chat id must not be empty")]
    MissingChatId,
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Everything the relay needs, resolved once at startup.
#[derive(Clone)]
pub struct RelayConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub shared_secret: Option<String>,
    pub rate_limit_per_window: u32,
    pub window: Duration,
    pub upstream_timeout: Duration,
    pub api_base: String,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("shared_secret", &self.shared_secret.as_ref().map(|_| "<redacted>"))
            .field("rate_limit_per_window", &self.rate_limit_per_window)
            .field("window", &self.window)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl RelayConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            shared_secret: None,
            rate_limit_per_window: 30,
            window: Duration::from_secs(60),
            upstream_timeout: Duration::from_secs(10),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot_token.trim().is_empty() {
            return Err(ConfigError::MissingBotToken);
        }
        if self.chat_id.trim().is_empty() {
            return Err(ConfigError::MissingChatId);
        }
        if self.rate_limit_per_window == 0 {
            return Err(ConfigError::Zero("rate limit"));
        }
        if self.window.is_zero() {
            return Err(ConfigError::Zero("rate window"));
        }
        if self.upstream_timeout.is_zero() {
            return Err(ConfigError::Zero("upstream timeout"));
        }
        Ok(())
    }
}

impl Args {
    pub fn relay_config(&self) -> Result<RelayConfig, ConfigError> {
        let config = RelayConfig {
            bot_token: self.bot_token.trim().to_string(),
            chat_id: self.chat_id.trim().to_string(),
            shared_secret: (!self.api_secret.is_empty()).then(|| self.api_secret.clone()),
            rate_limit_per_window: self.rate_limit,
            window: Duration::from_secs(self.rate_window),
            upstream_timeout: Duration::from_secs(self.upstream_timeout),
            api_base: self.telegram_api_base.trim_end_matches('/').to_string(),
        };
        config.validate()?;
        Ok(config)
    }
}
