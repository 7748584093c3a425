use secrecy::SecretString;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Defines the supported text-generation backends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    HuggingFace,
    OpenAI,
}

impl Provider {
    fn default_model(&self) -> &'static str {
        match self {
            Provider::HuggingFace => "google/flan-t5-large",
            Provider::OpenAI => "gpt-4o-mini",
        }
    }

    fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::HuggingFace => "https://api-inference.huggingface.co",
            Provider::OpenAI => "https://api.openai.com/v1",
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub provider: Provider,
    pub model_name: String,
    pub model_endpoint: String,
    pub hf_api_token: Option<SecretString>,
    pub openai_api_key: Option<SecretString>,
    pub static_dir: PathBuf,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// This function will look for a `.env` file in the current directory
    /// and load the following variables:
    ///
    /// *   `BIND_ADDRESS`: The address and port to bind the server to. Defaults to "0.0.0.0:5000".
    /// *   `MODEL_PROVIDER`: The backend to use. Can be "huggingface" or "openai". Defaults to "huggingface".
    /// *   `MODEL_NAME`: (Optional) The model to run. Defaults to "google/flan-t5-large" for huggingface, "gpt-4o-mini" for openai.
    /// *   `MODEL_ENDPOINT`: (Optional) Base URL of the inference API. Defaults to the provider's public endpoint.
    /// *   `HF_API_TOKEN`: (Optional) Token for the Hugging Face inference API.
    /// *   `OPENAI_API_KEY`: Your secret key for the OpenAI API. Required if provider is "openai".
    /// *   `STATIC_DIR`: (Optional) Directory holding `index.html` and its assets. Defaults to "static".
    /// *   `RUST_LOG`: (Optional) The logging level. Defaults to "DEBUG".
    ///
    /// `overrides` (from the command line) take precedence over the environment.
    pub fn from_env(overrides: &[(&str, String)]) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(with_overrides(overrides, |key| std::env::var(key).ok()))
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let provider_str = lookup("MODEL_PROVIDER").unwrap_or_else(|| "huggingface".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "huggingface" | "hf" => Provider::HuggingFace,
            "openai" => Provider::OpenAI,
            other => {
                return Err(ConfigError::InvalidValue(
                    "MODEL_PROVIDER".to_string(),
                    format!("'{}' is not one of 'huggingface', 'openai'", other),
                ));
            }
        };

        let model_name =
            lookup("MODEL_NAME").unwrap_or_else(|| provider.default_model().to_string());
        let model_endpoint = lookup("MODEL_ENDPOINT")
            .unwrap_or_else(|| provider.default_endpoint().to_string())
            .trim_end_matches('/')
            .to_string();

        let hf_api_token = lookup("HF_API_TOKEN").map(SecretString::from);
        let openai_api_key = lookup("OPENAI_API_KEY").map(SecretString::from);

        let static_dir = lookup("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("static"));

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "DEBUG".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // The hosted Hugging Face API works anonymously (rate limited), OpenAI does not.
        if provider == Provider::OpenAI && openai_api_key.is_none() {
            return Err(ConfigError::MissingVar(
                "OPENAI_API_KEY must be set for 'openai' provider".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            provider,
            model_name,
            model_endpoint,
            hf_api_token,
            openai_api_key,
            static_dir,
            log_level,
        })
    }
}

fn with_overrides<'a, F>(
    overrides: &'a [(&'a str, String)],
    fallback: F,
) -> impl Fn(&str) -> Option<String> + 'a
where
    F: Fn(&str) -> Option<String> + 'a,
{
    move |key: &str| {
        overrides
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.clone())
            .or_else(|| fallback(key))
    }
}
