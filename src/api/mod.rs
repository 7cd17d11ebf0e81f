pub mod openai;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("response contained no {0}")]
    MissingContent(&'static str),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The generative-AI operations the stages rely on.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Single-turn chat completion. Returns the trimmed reply.
    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: Option<f64>,
    ) -> Result<String, ProviderError>;

    /// Renders `text` as speech and streams the audio into `out`. Returns the bytes written.
    /// On failure nothing is left at `out`.
    async fn speech_to_file(&self, text: &str, out: &Path) -> Result<u64, ProviderError>;

    /// Generates one image and returns the URL it can be fetched from.
    async fn image_url(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Plain GET of a previously returned asset URL.
    async fn download(&self, url: &str) -> Result<Vec<u8>, ProviderError>;
}
