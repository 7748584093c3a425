use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use topic_chat_core::{DecodingParams, GenerationError, TextModel};

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Message,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub content: Option<String>,
}

/// An adapter that implements `TextModel` for any OpenAI-compatible
/// chat-completions endpoint (OpenAI itself, vLLM, llama.cpp server, ...).
pub struct OpenAIAdapter {
    client: Client,
    endpoint: String,
    api_key: Option<SecretString>,
    model: String,
    // api.openai.com rejects arguments outside its schema.
    send_repetition_penalty: bool,
}

impl OpenAIAdapter {
    pub fn new(endpoint: &str, model: &str, api_key: Option<SecretString>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            send_repetition_penalty: !endpoint.contains("api.openai.com"),
        }
    }
}

pub(crate) fn request_body(
    model: &str,
    prompt: &str,
    params: &DecodingParams,
    send_repetition_penalty: bool,
) -> serde_json::Value {
    let temperature = if params.do_sample { 1.0 } else { 0.0 };
    let mut body = serde_json::json!({
        "model": model,
        "messages": [
            { "role": "user", "content": prompt }
        ],
        "temperature": temperature,
        "max_tokens": params.max_length
    });
    // vLLM and llama.cpp server read this extension field.
    if send_repetition_penalty {
        body["repetition_penalty"] = serde_json::json!(params.repetition_penalty);
    }
    body
}

pub(crate) fn parse_response(body: &str) -> Result<String, GenerationError> {
    let resp: LlmResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Decode(e.to_string()))?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::Decode("No response from LLM".to_string()))?;
    Ok(choice.message.content.unwrap_or_default())
}

#[async_trait]
impl TextModel for OpenAIAdapter {
    async fn complete(
        &self,
        prompt: &str,
        params: &DecodingParams,
    ) -> Result<String, GenerationError> {
        let body = request_body(&self.model, prompt, params, self.send_repetition_penalty);
        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .json(&body);
        // Local OpenAI-compatible servers usually run without a key.
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
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
