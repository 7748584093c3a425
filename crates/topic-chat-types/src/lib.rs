//now clients and the server share the same event definitions
pub mod events;

//re-export types for easier access
pub use events::client::{TopicEvent, VoiceAnswerEvent};
pub use events::server::{
    BotResponseEvent, ConnectionStatus, ConnectionStatusEvent, ErrorEvent, ResponseType,
};
pub use events::{ClientEvent, DecodeError, EventKind, ServerEvent};
