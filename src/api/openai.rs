use crate::api::{Provider, ProviderError};
use crate::config::OpenAiSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

const ERROR_SNIPPET_CHARS: usize = 800;

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
}

pub struct OpenAiClient {
    client: Client,
    api_key: String,
    cfg: OpenAiSettings,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, cfg: OpenAiSettings) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, api_key, cfg))
    }

    pub fn with_client(client: Client, api_key: impl Into<String>, cfg: OpenAiSettings) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            cfg,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.cfg.api_base.trim_end_matches('/'), path)
    }

    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<Response, ProviderError> {
        let url = self.endpoint(path);
        debug!("POST {}", url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        check_status(resp).await
    }
}

async fn check_status(resp: Response) -> Result<Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let raw = resp.text().await.unwrap_or_default();
    Err(ProviderError::Http {
        status: status.as_u16(),
        message: error_message(&raw),
    })
}

/// Pulls the provider's own error description out of a failed response body.
fn error_message(raw: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(raw) {
        let err = envelope.error;
        let mut out = err.message;
        if let Some(kind) = err.kind {
            out.push_str(&format!(" (type: {})", kind));
        }
        if let Some(code) = err.code {
            out.push_str(&format!(" (code: {})", code));
        }
        return out;
    }

    if raw.is_empty() {
        return "empty response body".to_string();
    }
    raw.chars().take(ERROR_SNIPPET_CHARS).collect()
}

/// Sibling path the audio is streamed into before it is moved into place.
fn partial_path(out: &Path) -> PathBuf {
    let mut name = out.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

async fn stream_to_file(mut resp: Response, dest: &Path) -> Result<u64, ProviderError> {
    let mut file = fs::File::create(dest).await?;
    let mut written = 0u64;
    while let Some(chunk) = resp.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

fn extract_chat_text(raw: &str) -> Result<String, ProviderError> {
    let completion: ChatCompletion = serde_json::from_str(raw)?;
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .ok_or(ProviderError::MissingContent("message content"))
}

fn extract_image_url(raw: &str) -> Result<String, ProviderError> {
    let images: ImagesResponse = serde_json::from_str(raw)?;
    images
        .data
        .into_iter()
        .next()
        .and_then(|image| image.url)
        .ok_or(ProviderError::MissingContent("image url"))
}

#[async_trait]
impl Provider for OpenAiClient {
    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: Option<f64>,
    ) -> Result<String, ProviderError> {
        let mut body = json!({
            "model": self.cfg.text_model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });
        if let Some(temperature) = temperature {
            body["temperature"] = json!(temperature);
        }

        let raw = self.post_json("chat/completions", &body).await?.text().await?;
        extract_chat_text(&raw)
    }

    async fn speech_to_file(&self, text: &str, out: &Path) -> Result<u64, ProviderError> {
        let body = json!({
            "model": self.cfg.speech_model,
            "voice": self.cfg.speech_voice,
            "speed": self.cfg.speech_speed,
            "input": text,
            "response_format": "mp3",
        });

        let resp = self.post_json("audio/speech", &body).await?;
        let part = partial_path(out);
        match stream_to_file(resp, &part).await {
            Ok(written) => {
                fs::rename(&part, out).await?;
                debug!("wrote {} audio bytes to {}", written, out.display());
                Ok(written)
            }
            Err(err) => {
                let _ = fs::remove_file(&part).await;
                Err(err)
            }
        }
    }

    async fn image_url(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.cfg.image_model,
            "prompt": prompt,
            "size": self.cfg.image_size,
            "quality": self.cfg.image_quality,
            "n": 1,
        });

        let raw = self
            .post_json("images/generations", &body)
            .await?
            .text()
            .await?;
        extract_image_url(&raw)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        debug!("GET {}", url);
        let resp = check_status(self.client.get(url).send().await?).await?;
        Ok(resp.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_text_is_trimmed() {
        let raw = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"  Close your eyes.\n"}}]}"#;
        assert_eq!(extract_chat_text(raw).unwrap(), "Close your eyes.");
    }

    #[test]
    fn chat_without_choices_is_missing_content() {
        let err = extract_chat_text(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, ProviderError::MissingContent(_)));
    }

    #[test]
    fn chat_with_null_content_is_missing_content() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert!(matches!(
            extract_chat_text(raw).unwrap_err(),
            ProviderError::MissingContent(_)
        ));
    }

    #[test]
    fn image_url_is_taken_from_first_entry() {
        let raw = r#"{"created":1,"data":[{"url":"https://cdn.example/a.png","revised_prompt":"x"}]}"#;
        assert_eq!(extract_image_url(raw).unwrap(), "https://cdn.example/a.png");
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        assert!(matches!(
            extract_image_url("<html>").unwrap_err(),
            ProviderError::Decode(_)
        ));
    }

    #[test]
    fn provider_error_message_is_preferred() {
        let raw = r#"{"error":{"message":"Rate limit reached","type":"requests","code":"rate_limit_exceeded"}}"#;
        assert_eq!(
            error_message(raw),
            "Rate limit reached (type: requests) (code: rate_limit_exceeded)"
        );
    }

    #[test]
    fn non_json_error_body_is_truncated() {
        let raw = "x".repeat(2000);
        assert_eq!(error_message(&raw).len(), ERROR_SNIPPET_CHARS);
        assert_eq!(error_message(""), "empty response body");
    }

    #[test]
    fn endpoint_joins_base_without_double_slash() {
        let cfg = OpenAiSettings {
            api_base: "http://localhost:8080/v1/".to_string(),
            ..OpenAiSettings::default()
        };
        let client = OpenAiClient::with_client(Client::new(), "key", cfg);
        assert_eq!(
            client.endpoint("chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("out/story.mp3")),
            PathBuf::from("out/story.mp3.part")
        );
    }

    /// Serves one response that promises more body than it sends, then hangs up.
    async fn serve_truncated_audio() -> String {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: audio/mpeg\r\nContent-Length: 100000\r\n\r\nPARTIALMP3")
                .await;
            let _ = socket.flush().await;
        });
        format!("http://{}/v1", addr)
    }

    #[tokio::test]
    async fn interrupted_speech_stream_leaves_no_audio_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("story.mp3");
        let cfg = OpenAiSettings {
            api_base: serve_truncated_audio().await,
            ..OpenAiSettings::default()
        };
        let http = Client::builder().no_proxy().build().unwrap();
        let client = OpenAiClient::with_client(http, "key", cfg);

        let result = client.speech_to_file("Breathe in.", &out).await;

        assert!(result.is_err());
        assert!(!out.exists());
        assert!(!partial_path(&out).exists());
    }
}
