use std::time::Instant;
use thiserror::Error;
use tracing::debug;

use crate::config::RelayConfig;
use crate::metrics::UPSTREAM_LATENCY;
use crate::models::{SendMessage, TelegramResponse};

#[derive(Debug, Error)]
pub enum TelegramError {
    // connect failure, timeout, broken body stream
    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    #[error("telegram answered {status}: {}", .description.as_deref().unwrap_or("no description"))]
    Rejected {
        status: u16,
        description: Option<String>,
    },

    #[error("unreadable telegram response: {0}")]
    Decode(reqwest::Error),
}

/// Outbound side of the relay: one bot, one destination chat.
#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    send_url: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn new(config: &RelayConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        Ok(Self {
            client,
            send_url: format!("{}/bot{}/sendMessage", config.api_base, config.bot_token),
            chat_id: config.chat_id.clone(),
        })
    }

    pub async fn send_message(&self, text: String) -> Result<(), TelegramError> {
        let payload = SendMessage {
            chat_id: self.chat_id.clone(),
            text,
        };

        let start_time = Instant::now();
        // the url embeds the bot token, keep it out of every error we surface
        let res = self
            .client
            .post(&self.send_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| TelegramError::Transport(e.without_url()));
        UPSTREAM_LATENCY.observe(start_time.elapsed().as_secs_f64());
        let res = res?;

        let status = res.status();
        if !status.is_success() {
            let description = res
                .json::<TelegramResponse>()
                .await
                .ok()
                .and_then(|body| body.description);
            return Err(TelegramError::Rejected {
                status: status.as_u16(),
                description,
            });
        }

        let body: TelegramResponse = res
            .json()
            .await
            .map_err(|e| TelegramError::Decode(e.without_url()))?;

        if !body.ok {
            return Err(TelegramError::Rejected {
                status: status.as_u16(),
                description: body.description,
            });
        }

        debug!(chat_id = %self.chat_id, "Telegram accepted message");
        Ok(())
    }
}
