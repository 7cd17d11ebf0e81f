use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// Errors that stop the process before any stage runs.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("OpenAI API key not found. Set OPENAI_API_KEY in the environment or a .env file.")]
    MissingApiKey,
    #[error("{} file not found.", .0.display())]
    SettingsNotFound(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    SettingsUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    SettingsInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// How a multi-request loop reacts to a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failure and keep what was already produced.
    Abort,
    /// Log the failure and move on to the next request.
    Continue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub user_message: String,
    #[serde(default = "default_text_output_file")]
    pub text_output_file: PathBuf,
    #[serde(default = "default_image_output_folder")]
    pub default_image_output_folder: PathBuf,
    #[serde(default = "default_num_images")]
    pub default_num_images: usize,
    #[serde(default = "default_max_num_images")]
    pub max_num_images: usize,
    #[serde(default)]
    pub default_music_file: Option<PathBuf>,
    #[serde(default)]
    pub default_output_file: Option<PathBuf>,
    #[serde(default = "default_prompt_failure_policy")]
    pub prompt_failure_policy: FailurePolicy,
    #[serde(default = "default_image_failure_policy")]
    pub image_failure_policy: FailurePolicy,
    #[serde(default)]
    pub openai: OpenAiSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSettings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_text_model")]
    pub text_model: String,
    #[serde(default = "default_speech_model")]
    pub speech_model: String,
    #[serde(default = "default_speech_voice")]
    pub speech_voice: String,
    #[serde(default = "default_speech_speed")]
    pub speech_speed: f64,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_image_size")]
    pub image_size: String,
    #[serde(default = "default_image_quality")]
    pub image_quality: String,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            text_model: default_text_model(),
            speech_model: default_speech_model(),
            speech_voice: default_speech_voice(),
            speech_speed: default_speech_speed(),
            image_model: default_image_model(),
            image_size: default_image_size(),
            image_quality: default_image_quality(),
        }
    }
}

fn default_text_output_file() -> PathBuf {
    PathBuf::from("text_output.txt")
}

fn default_image_output_folder() -> PathBuf {
    PathBuf::from("image_output")
}

fn default_num_images() -> usize {
    5
}

fn default_max_num_images() -> usize {
    5
}

fn default_prompt_failure_policy() -> FailurePolicy {
    FailurePolicy::Abort
}

fn default_image_failure_policy() -> FailurePolicy {
    FailurePolicy::Continue
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_text_model() -> String {
    "gpt-4".to_string()
}

fn default_speech_model() -> String {
    "tts-1".to_string()
}

fn default_speech_voice() -> String {
    "nova".to_string()
}

fn default_speech_speed() -> f64 {
    0.75
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_size() -> String {
    "1792x1024".to_string()
}

fn default_image_quality() -> String {
    "hd".to_string()
}

impl Settings {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StartupError::SettingsNotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(StartupError::SettingsUnreadable {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Self::from_json(&content).map_err(|source| StartupError::SettingsInvalid {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Reads the provider credential. An empty value counts as missing.
pub fn api_key_from_env() -> Result<String, StartupError> {
    match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(StartupError::MissingApiKey),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings.user_message, "");
        assert_eq!(settings.text_output_file, PathBuf::from("text_output.txt"));
        assert_eq!(settings.default_image_output_folder, PathBuf::from("image_output"));
        assert_eq!(settings.default_num_images, 5);
        assert_eq!(settings.max_num_images, 5);
        assert!(settings.default_music_file.is_none());
        assert!(settings.default_output_file.is_none());
        assert_eq!(settings.prompt_failure_policy, FailurePolicy::Abort);
        assert_eq!(settings.image_failure_policy, FailurePolicy::Continue);
        assert_eq!(settings.openai.text_model, "gpt-4");
        assert_eq!(settings.openai.speech_voice, "nova");
        assert_eq!(settings.openai.image_size, "1792x1024");
    }

    #[test]
    fn recognized_keys_are_read() {
        let settings = Settings::from_json(
            r#"{
                "user_message": "Write a short meditation about the sea.",
                "text_output_file": "sea.txt",
                "default_image_output_folder": "frames",
                "default_num_images": 3,
                "max_num_images": 8,
                "default_music_file": "calm.mp3",
                "default_output_file": "sea.mp4",
                "prompt_failure_policy": "continue",
                "openai": { "text_model": "gpt-4o", "speech_speed": 1.0 },
                "unrelated": true
            }"#,
        )
        .unwrap();

        assert_eq!(settings.user_message, "Write a short meditation about the sea.");
        assert_eq!(settings.text_output_file, PathBuf::from("sea.txt"));
        assert_eq!(settings.default_num_images, 3);
        assert_eq!(settings.max_num_images, 8);
        assert_eq!(settings.default_music_file, Some(PathBuf::from("calm.mp3")));
        assert_eq!(settings.prompt_failure_policy, FailurePolicy::Continue);
        assert_eq!(settings.openai.text_model, "gpt-4o");
        assert_eq!(settings.openai.speech_model, "tts-1");
        assert_eq!(settings.openai.speech_speed, 1.0);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(Settings::from_json(r#"{"image_failure_policy": "retry"}"#).is_err());
    }

    #[tokio::test]
    async fn missing_file_is_reported_as_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(dir.path().join("settings.json")).await.unwrap_err();
        assert!(matches!(err, StartupError::SettingsNotFound(_)));
    }

    #[tokio::test]
    async fn malformed_file_is_reported_as_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Settings::load(&path).await.unwrap_err();
        assert!(matches!(err, StartupError::SettingsInvalid { .. }));
    }
}
