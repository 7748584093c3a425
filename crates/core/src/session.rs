use crate::error::ValidationError;
use crate::generator::Generator;
use crate::prompt::{self, Channel};
use topic_chat_types::{
    ClientEvent, DecodeError, ResponseType, ServerEvent, TopicEvent, VoiceAnswerEvent,
};

/// The capability to push events to one connected client.
pub type ClientTx = tokio::sync::mpsc::Sender<ServerEvent>;

/// One connected client.
///
/// A session owns nothing but its id, a handle to the shared `Generator`,
/// and the sender for its outgoing events. Each handler runs to completion
/// and either emits its normal replies or exactly one `error` event.
pub struct ChatSession {
    id: String,
    generator: Generator,
    client_tx: ClientTx,
}

impl ChatSession {
    pub fn new(id: impl Into<String>, generator: Generator, client_tx: ClientTx) -> Self {
        Self {
            id: id.into(),
            generator,
            client_tx,
        }
    }

    pub async fn on_connect(&self) {
        tracing::info!("Client connected: {}", self.id);
        self.emit(ServerEvent::connected()).await;
    }

    pub fn on_disconnect(self) {
        tracing::info!("Client disconnected: {}", self.id);
    }

    /// Decodes a raw text frame and dispatches it.
    ///
    /// Garbage frames and unknown events are logged and dropped. A known event
    /// with an unusable payload is answered with that channel's error message.
    pub async fn handle_frame(&self, frame: &str) {
        match ClientEvent::from_json(frame) {
            Ok(event) => self.dispatch(event).await,
            Err(DecodeError::InvalidPayload { event, source }) => {
                let err = ValidationError::InvalidPayload(source.to_string());
                self.emit_failure(Channel::from(event), &err).await;
            }
            Err(e) => tracing::warn!("Ignoring frame from client {}: {}", self.id, e),
        }
    }

    pub async fn dispatch(&self, event: ClientEvent) {
        tracing::debug!("Client {} sent '{}'", self.id, event.kind());
        match event {
            ClientEvent::Topic(topic) => self.handle_topic(&topic).await,
            ClientEvent::VoiceAnswer(voice) => self.handle_voice_answer(&voice).await,
        }
    }

    pub async fn handle_topic(&self, event: &TopicEvent) {
        match self.answer_topic(event.text()).await {
            Ok(replies) => {
                for reply in replies {
                    self.emit(reply).await;
                }
            }
            Err(e) => self.emit_failure(Channel::Topic, &e).await,
        }
    }

    pub async fn handle_voice_answer(&self, event: &VoiceAnswerEvent) {
        match self.answer_voice(event.audio()).await {
            Ok(reply) => self.emit(reply).await,
            Err(e) => self.emit_failure(Channel::Voice, &e).await,
        }
    }

    // Explanation first, then the conversation opener. Both are generated
    // before either is sent.
    async fn answer_topic(&self, text: &str) -> Result<[ServerEvent; 2], ValidationError> {
        let prompts = prompt::topic_prompts(text)?;
        tracing::info!("Topic received from {}: {}", self.id, prompts.topic);

        let summary = self.generator.generate(&prompts.explanation).await;
        let question = self.generator.generate(&prompts.opener).await;

        Ok([
            ServerEvent::bot_response(&summary, ResponseType::System),
            ServerEvent::bot_response(&question, ResponseType::System),
        ])
    }

    async fn answer_voice(&self, audio: &str) -> Result<ServerEvent, ValidationError> {
        let voice = prompt::voice_prompt(audio)?;
        tracing::info!("User {} said: {} ({:?})", self.id, voice.text, voice.kind);

        let answer = self.generator.generate(&voice.prompt).await;
        Ok(ServerEvent::bot_response(&answer, ResponseType::Text))
    }

    async fn emit_failure(&self, channel: Channel, err: &ValidationError) {
        tracing::warn!("{} for client {}: {}", channel.failure_prefix(), self.id, err);
        let message = format!("{}: {}", channel.failure_prefix(), err);
        self.emit(ServerEvent::error(&message)).await;
    }

    async fn emit(&self, event: ServerEvent) {
        if let Err(e) = self.client_tx.send(event).await {
            tracing::warn!("Failed to deliver event to client {}: {}", self.id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{FALLBACK_RESPONSE, MockTextModel};
    use crate::GenerationError;
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use topic_chat_types::{BotResponseEvent, ConnectionStatus};

    fn session_with(model: MockTextModel) -> (ChatSession, mpsc::Receiver<ServerEvent>) {
        let (client_tx, client_rx) = mpsc::channel(8);
        let session = ChatSession::new("test-client", Generator::new(Arc::new(model)), client_tx);
        (session, client_rx)
    }

    fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn bot_response(event: &ServerEvent) -> &BotResponseEvent {
        match event {
            ServerEvent::BotResponse(response) => response,
            other => panic!("Expected a bot_response, got {:?}", other),
        }
    }

    fn error_message(event: &ServerEvent) -> &str {
        match event {
            ServerEvent::Error(error) => error.message(),
            other => panic!("Expected an error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn connect_acknowledges_client() {
        let (session, mut rx) = session_with(MockTextModel::new());

        session.on_connect().await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            ServerEvent::ConnectionStatus(status) => {
                assert_eq!(status.status(), ConnectionStatus::Connected)
            }
            other => panic!("Expected connection_status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn topic_emits_explanation_then_question() {
        let mut model = MockTextModel::new();
        model
            .expect_complete()
            .times(2)
            .returning(|prompt, _| {
                if prompt.starts_with("Write a comprehensive explanation about: volcanoes.") {
                    Ok("Volcanoes are openings in the crust.".to_string())
                } else if prompt.starts_with("Suggest a good first question") {
                    Ok("Have you ever seen a volcano erupt?".to_string())
                } else {
                    Err(GenerationError::Api(format!("unexpected prompt: {prompt}")))
                }
            });
        let (session, mut rx) = session_with(model);

        session.handle_topic(&TopicEvent::new("volcanoes")).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2, "Topic should produce exactly two replies");
        let first = bot_response(&events[0]);
        let second = bot_response(&events[1]);
        assert_eq!(first.text(), "Volcanoes are openings in the crust.");
        assert_eq!(first.response_type(), ResponseType::System);
        assert_eq!(second.text(), "Have you ever seen a volcano erupt?");
        assert_eq!(second.response_type(), ResponseType::System);
    }

    #[tokio::test]
    async fn blank_topic_emits_one_error_without_generating() {
        let mut model = MockTextModel::new();
        model.expect_complete().never();
        let (session, mut rx) = session_with(model);

        session.handle_topic(&TopicEvent::new("   ")).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(error_message(&events[0]), "Topic handling failed: Empty topic text");
    }

    #[tokio::test]
    async fn voice_question_emits_one_text_reply() {
        let mut model = MockTextModel::new();
        model
            .expect_complete()
            .withf(|prompt, _| prompt.starts_with("Write a long, in-depth answer to the question:"))
            .times(1)
            .returning(|_, _| Ok("Rayleigh scattering.".to_string()));
        let (session, mut rx) = session_with(model);

        session
            .handle_voice_answer(&VoiceAnswerEvent::new("Why is the sky blue?"))
            .await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        let reply = bot_response(&events[0]);
        assert_eq!(reply.text(), "Rayleigh scattering.");
        assert_eq!(reply.response_type(), ResponseType::Text);
    }

    #[tokio::test]
    async fn voice_statement_asks_for_long_explanation() {
        let mut model = MockTextModel::new();
        model
            .expect_complete()
            .withf(|prompt, _| {
                prompt.starts_with("Write a comprehensive explanation about: jazz.")
                    && prompt.ends_with("At least 300 words.")
            })
            .times(1)
            .returning(|_, _| Ok("Jazz began in New Orleans.".to_string()));
        let (session, mut rx) = session_with(model);

        session.handle_voice_answer(&VoiceAnswerEvent::new(" jazz ")).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(bot_response(&events[0]).response_type(), ResponseType::Text);
    }

    #[tokio::test]
    async fn blank_voice_emits_one_error_without_generating() {
        let mut model = MockTextModel::new();
        model.expect_complete().never();
        let (session, mut rx) = session_with(model);

        session.handle_voice_answer(&VoiceAnswerEvent::new("")).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(
            error_message(&events[0]),
            "Voice processing failed: No text from client"
        );
    }

    #[tokio::test]
    async fn failing_model_still_answers_with_fallback() {
        let mut model = MockTextModel::new();
        model
            .expect_complete()
            .times(1)
            .returning(|_, _| Err(GenerationError::Transport("connection refused".to_string())));
        let (session, mut rx) = session_with(model);

        session
            .handle_voice_answer(&VoiceAnswerEvent::new("tell me about owls"))
            .await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(bot_response(&events[0]).text(), FALLBACK_RESPONSE);
    }

    #[tokio::test]
    async fn failing_model_on_topic_sends_two_fallbacks() {
        let mut model = MockTextModel::new();
        model
            .expect_complete()
            .times(2)
            .returning(|_, _| Err(GenerationError::Api("model unavailable".to_string())));
        let (session, mut rx) = session_with(model);

        session.handle_topic(&TopicEvent::new("glaciers")).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        for event in &events {
            let reply = bot_response(event);
            assert_eq!(reply.text(), FALLBACK_RESPONSE);
            assert_eq!(reply.response_type(), ResponseType::System);
        }
    }

    #[tokio::test]
    async fn frames_are_dispatched_by_event_name() {
        let mut model = MockTextModel::new();
        model
            .expect_complete()
            .times(1)
            .returning(|_, _| Ok("An answer.".to_string()));
        let (session, mut rx) = session_with(model);

        session
            .handle_frame(r#"{"event":"voice_answer","data":{"audio":"what is rust?"}}"#)
            .await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(bot_response(&events[0]).text(), "An answer.");
    }

    #[tokio::test]
    async fn unknown_and_garbage_frames_are_ignored() {
        let mut model = MockTextModel::new();
        model.expect_complete().never();
        let (session, mut rx) = session_with(model);

        session.handle_frame(r#"{"event":"dance","data":{}}"#).await;
        session.handle_frame("not json").await;

        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn bad_payload_type_reports_channel_error() {
        let mut model = MockTextModel::new();
        model.expect_complete().never();
        let (session, mut rx) = session_with(model);

        session.handle_frame(r#"{"event":"topic","data":{"text":7}}"#).await;
        session
            .handle_frame(r#"{"event":"voice_answer","data":{"audio":["hi"]}}"#)
            .await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(error_message(&events[0]).starts_with("Topic handling failed: Invalid payload:"));
        assert!(error_message(&events[1]).starts_with("Voice processing failed: Invalid payload:"));
    }

    #[tokio::test]
    async fn closed_client_does_not_break_handler() {
        let mut model = MockTextModel::new();
        model
            .expect_complete()
            .times(2)
            .returning(|_, _| Ok("text".to_string()));
        let (session, rx) = session_with(model);
        drop(rx);

        // Nothing to assert beyond not panicking.
        session.handle_topic(&TopicEvent::new("tides")).await;
        session.on_disconnect();
    }
}
