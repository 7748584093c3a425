/// `topic` event
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct TopicEvent {
    /// The topic as typed by the user, untrimmed
    #[serde(default)]
    text: String,
}

impl TopicEvent {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

//speech is transcribed in the browser, so `audio` is already text
/// `voice_answer` event
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct VoiceAnswerEvent {
    #[serde(default)]
    audio: String,
}

impl VoiceAnswerEvent {
    pub fn new(audio: &str) -> Self {
        Self {
            audio: audio.to_string(),
        }
    }

    pub fn audio(&self) -> &str {
        &self.audio
    }
}
