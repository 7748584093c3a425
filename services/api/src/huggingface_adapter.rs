use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use topic_chat_core::{DecodingParams, GenerationError, TextModel};

/// An adapter that implements `TextModel` on top of a Hugging Face style
/// text-generation endpoint (`POST {endpoint}/models/{model}`).
pub struct HuggingFaceAdapter {
    client: Client,
    url: String,
    token: Option<SecretString>,
}

impl HuggingFaceAdapter {
    pub fn new(endpoint: &str, model: &str, token: Option<SecretString>) -> Self {
        Self {
            client: Client::new(),
            url: format!("{}/models/{}", endpoint.trim_end_matches('/'), model),
            token,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}

// The endpoint answers with a list for batched inputs, a bare object for some
// seq2seq models, and `{"error": ...}` while the model is loading or broken.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Failure { error: String },
    Batch(Vec<Generation>),
    Single(Generation),
}

pub(crate) fn request_body(prompt: &str, params: &DecodingParams) -> serde_json::Value {
    // No pad token field: the serving runtime already pads with EOS for these models.
    serde_json::json!({
        "inputs": prompt,
        "parameters": {
            "do_sample": params.do_sample,
            "max_new_tokens": params.max_length,
            "repetition_penalty": params.repetition_penalty,
            "return_full_text": false
        },
        "options": {
            "wait_for_model": true
        }
    })
}

pub(crate) fn parse_response(body: &str) -> Result<String, GenerationError> {
    let response: InferenceResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Decode(e.to_string()))?;

    match response {
        InferenceResponse::Failure { error } => Err(GenerationError::Api(error)),
        InferenceResponse::Single(generation) => Ok(generation.generated_text),
        InferenceResponse::Batch(generations) => generations
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| GenerationError::Decode("No generations in response".to_string())),
    }
}

#[async_trait]
impl TextModel for HuggingFaceAdapter {
    async fn complete(
        &self,
        prompt: &str,
        params: &DecodingParams,
    ) -> Result<String, GenerationError> {
        let mut request = self.client.post(&self.url).json(&request_body(prompt, params));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_response(&body)
    }
}
