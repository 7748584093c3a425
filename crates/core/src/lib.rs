pub mod error;
pub mod generator;
pub mod prompt;
pub mod session;

pub use topic_chat_types as types;

pub use error::{GenerationError, ValidationError};
pub use generator::{DecodingParams, FALLBACK_RESPONSE, Generator, TextModel};
pub use session::{ChatSession, ClientTx};
