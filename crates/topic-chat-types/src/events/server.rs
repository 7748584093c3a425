#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
}

/// `connection_status` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConnectionStatusEvent {
    status: ConnectionStatus,
}

impl ConnectionStatusEvent {
    pub fn new(status: ConnectionStatus) -> Self {
        Self { status }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }
}

/// How the page renders a response: `system` for topic replies, `text` for voice answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    System,
    Text,
}

/// `bot_response` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BotResponseEvent {
    text: String,
    #[serde(rename = "type")]
    response_type: ResponseType,
}

impl BotResponseEvent {
    pub fn new(text: &str, response_type: ResponseType) -> Self {
        Self {
            text: text.to_string(),
            response_type,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn response_type(&self) -> ResponseType {
        self.response_type
    }
}

/// `error` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ErrorEvent {
    message: String,
}

impl ErrorEvent {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
