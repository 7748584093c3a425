use crate::error::GenerationError;
use async_trait::async_trait;
use futures_util::FutureExt;
#[cfg(test)]
use mockall::automock;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// What the client receives whenever inference fails for any reason.
pub const FALLBACK_RESPONSE: &str = "I'm sorry, I couldn't process that.";

/// Decoding settings sent with every prompt.
///
/// Padding always uses the end-of-sequence token. Neither backend takes a pad
/// token id: both serving runtimes pad with EOS themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodingParams {
    /// `false` means greedy decoding.
    pub do_sample: bool,
    /// Upper bound on generated tokens.
    pub max_length: u32,
    pub repetition_penalty: f32,
}

impl Default for DecodingParams {
    fn default() -> Self {
        Self {
            do_sample: false,
            max_length: 512,
            repetition_penalty: 1.1,
        }
    }
}

// The `TextModel` trait is the seam between the chat handlers and whatever
// actually runs inference. Backends (a hosted inference endpoint, an
// OpenAI-compatible server) implement it, and tests replace it with
// `MockTextModel`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        params: &DecodingParams,
    ) -> Result<String, GenerationError>;
}

/// Wraps a `TextModel` with the fixed decoding settings and the fallback.
///
/// `generate` never fails: backend errors and panics are logged and replaced
/// by [`FALLBACK_RESPONSE`].
#[derive(Clone)]
pub struct Generator {
    model: Arc<dyn TextModel>,
    params: DecodingParams,
}

impl Generator {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self {
            model,
            params: DecodingParams::default(),
        }
    }

    pub async fn generate(&self, prompt: &str) -> String {
        tracing::debug!("Prompt: {}", prompt);

        let result = AssertUnwindSafe(self.model.complete(prompt, &self.params))
            .catch_unwind()
            .await
            .unwrap_or(Err(GenerationError::Panicked));

        match result {
            Ok(text) => {
                tracing::debug!("Response: {}", text);
                text
            }
            Err(e) => {
                tracing::error!("Generation error: {} (prompt: {:?})", e, prompt);
                FALLBACK_RESPONSE.to_string()
            }
        }
    }
}
