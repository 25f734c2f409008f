use serde::{Deserialize, Serialize};

// Successful relay response
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendResponse {
    pub success: bool,
}

// Error response body, shared by every failure status
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

// Telegram sendMessage request format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SendMessage {
    pub chat_id: String,
    pub text: String,
}

// Telegram API response envelope, only the fields we act on
#[derive(Debug, Deserialize, Clone)]
pub struct TelegramResponse {
    // only an explicit `false` counts as a rejection
    #[serde(default = "default_ok")]
    pub ok: bool,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_ok() -> bool {
    true
}

/// A validated, sanitized message ready to be relayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayRequest {
    pub name: String,
    pub message: String,
    pub client_id: String,
}
