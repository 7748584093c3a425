//! Turns raw user input into instruction prompts for the model.
//!
//! Everything here is pure: the same input always yields the same prompts,
//! and empty input is rejected before any inference is attempted.

use crate::error::ValidationError;
use topic_chat_types::EventKind;

/// Where a piece of user input came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Topic,
    Voice,
}

impl Channel {
    /// Prefix of the `error` message sent back when handling fails on this channel.
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            Channel::Topic => "Topic handling failed",
            Channel::Voice => "Voice processing failed",
        }
    }

}

impl From<EventKind> for Channel {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Topic => Channel::Topic,
            EventKind::VoiceAnswer => Channel::Voice,
        }
    }
}

/// The two prompts issued for a submitted topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPrompts {
    pub topic: String,
    pub explanation: String,
    pub opener: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utterance {
    Question,
    Statement,
}

impl Utterance {
    /// A trailing `?` is the only thing that makes an utterance a question.
    pub fn classify(text: &str) -> Self {
        if text.trim_end().ends_with('?') {
            Utterance::Question
        } else {
            Utterance::Statement
        }
    }
}

/// The single prompt issued for a voice submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePrompt {
    pub text: String,
    pub kind: Utterance,
    pub prompt: String,
}

pub fn topic_prompts(text: &str) -> Result<TopicPrompts, ValidationError> {
    let topic = text.trim();
    if topic.is_empty() {
        return Err(ValidationError::EmptyTopic);
    }

    Ok(TopicPrompts {
        topic: topic.to_string(),
        explanation: format!(
            "Write a comprehensive explanation about: {topic}. Cover origin, usage, examples, and impacts. At least 100 words."
        ),
        opener: format!("Suggest a good first question to start a conversation about: {topic}"),
    })
}

pub fn voice_prompt(audio: &str) -> Result<VoicePrompt, ValidationError> {
    let text = audio.trim();
    if text.is_empty() {
        return Err(ValidationError::NoVoiceText);
    }

    let kind = Utterance::classify(text);
    let prompt = match kind {
        Utterance::Question => format!(
            "Write a long, in-depth answer to the question: {text}. Include background, examples, and implications."
        ),
        Utterance::Statement => format!(
            "Write a comprehensive explanation about: {text}. Cover origin, usage, examples, and impacts. At least 300 words."
        ),
    };

    Ok(VoicePrompt {
        text: text.to_string(),
        kind,
        prompt,
    })
}
