pub mod client;
pub mod server;

use client::*;
use server::*;

/// Name of the client event carrying a typed topic.
pub const TOPIC: &str = "topic";
/// Name of the client event carrying transcribed speech.
pub const VOICE_ANSWER: &str = "voice_answer";

/// The client events the server understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Topic,
    VoiceAnswer,
}

impl EventKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            TOPIC => Some(EventKind::Topic),
            VOICE_ANSWER => Some(EventKind::VoiceAnswer),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Topic => TOPIC,
            EventKind::VoiceAnswer => VOICE_ANSWER,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Every frame on the socket is a JSON object `{"event": <name>, "data": <payload>}`.
#[derive(Debug, serde::Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl Envelope {
    /// Looks up the event name and decodes the payload into its typed form.
    fn into_event(self) -> Result<ClientEvent, DecodeError> {
        let kind = EventKind::from_name(&self.event).ok_or(DecodeError::UnknownEvent(self.event))?;
        let decoded = match kind {
            EventKind::Topic => payload(self.data).map(ClientEvent::Topic),
            EventKind::VoiceAnswer => payload(self.data).map(ClientEvent::VoiceAnswer),
        };
        decoded.map_err(|source| DecodeError::InvalidPayload { event: kind, source })
    }
}

// A missing `data` behaves like an empty object.
fn payload<T>(data: serde_json::Value) -> Result<T, serde_json::Error>
where
    T: serde::de::DeserializeOwned + Default,
{
    if data.is_null() {
        Ok(T::default())
    } else {
        serde_json::from_value(data)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("frame is not a valid event envelope: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("unknown event: {0}")]
    UnknownEvent(String),
    #[error("invalid payload for '{event}': {source}")]
    InvalidPayload {
        event: EventKind,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    Topic(TopicEvent),
    VoiceAnswer(VoiceAnswerEvent),
}

impl ClientEvent {
    /// Decodes a raw text frame received from a client.
    pub fn from_json(text: &str) -> Result<Self, DecodeError> {
        let envelope: Envelope = serde_json::from_str(text).map_err(DecodeError::Malformed)?;
        envelope.into_event()
    }

    pub fn kind(&self) -> EventKind {
        match self {
            ClientEvent::Topic(_) => EventKind::Topic,
            ClientEvent::VoiceAnswer(_) => EventKind::VoiceAnswer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "connection_status")]
    ConnectionStatus(ConnectionStatusEvent),
    #[serde(rename = "bot_response")]
    BotResponse(BotResponseEvent),
    #[serde(rename = "error")]
    Error(ErrorEvent),
}

impl ServerEvent {
    pub fn connected() -> Self {
        ServerEvent::ConnectionStatus(ConnectionStatusEvent::new(ConnectionStatus::Connected))
    }

    pub fn bot_response(text: &str, response_type: ResponseType) -> Self {
        ServerEvent::BotResponse(BotResponseEvent::new(text, response_type))
    }

    pub fn error(message: &str) -> Self {
        ServerEvent::Error(ErrorEvent::new(message))
    }
}
