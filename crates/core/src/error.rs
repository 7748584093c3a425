/// Input problems detected before any model call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Empty topic text")]
    EmptyTopic,
    #[error("No text from client")]
    NoVoiceText,
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Failures inside a model backend. These never reach the client as-is;
/// the `Generator` logs them and answers with the fallback sentence.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("request to model endpoint failed: {0}")]
    Transport(String),
    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode model response: {0}")]
    Decode(String),
    #[error("model endpoint reported an error: {0}")]
    Api(String),
    #[error("model panicked during inference")]
    Panicked,
}
