use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use topic_chat_core::{Generator, TextModel};
use topic_chat_server::config::{Config, Provider};
use topic_chat_server::huggingface_adapter::HuggingFaceAdapter;
use topic_chat_server::openai_adapter::OpenAIAdapter;
use topic_chat_server::{AppState, router};
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[derive(Parser)]
#[command(version, about = "Chat server that explains topics with a text-generation model")]
struct Cli {
    /// Overrides BIND_ADDRESS
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Overrides STATIC_DIR
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();
        if let Some(bind) = self.bind {
            overrides.push(("BIND_ADDRESS", bind.to_string()));
        }
        if let Some(static_dir) = &self.static_dir {
            overrides.push(("STATIC_DIR", static_dir.to_string_lossy().into_owned()));
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let args = Cli::parse();
    let mut config =
        Config::from_env(&args.overrides()).context("Failed to load server configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    info!("Configuration loaded successfully. Starting topic chat server...");

    // --- 3. Build the model client once; every connection shares it ---
    let model = build_model(&mut config);
    info!(
        "Using {:?} backend with model '{}' at {}",
        config.provider, config.model_name, config.model_endpoint
    );
    let state = Arc::new(AppState::new(Generator::new(model)));

    // --- 4. Serve ---
    let app = router(state, &config.static_dir);
    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!("Listening on {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl-C, shutting down...");
            }
        })
        .await
        .context("Server error")?;

    info!("Shutting down...");
    Ok(())
}

// Secrets move into the adapter and are no longer held by the config.
fn build_model(config: &mut Config) -> Arc<dyn TextModel> {
    match config.provider {
        Provider::HuggingFace => Arc::new(HuggingFaceAdapter::new(
            &config.model_endpoint,
            &config.model_name,
            config.hf_api_token.take(),
        )),
        Provider::OpenAI => Arc::new(OpenAIAdapter::new(
            &config.model_endpoint,
            &config.model_name,
            config.openai_api_key.take(),
        )),
    }
}
