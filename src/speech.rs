use crate::api::Provider;
use crate::{loge, logok};
use std::path::{Path, PathBuf};
use tokio::fs;

pub const AUDIO_EXTENSION: &str = "mp3";

/// The voice-over file that belongs to a text file: same stem, audio extension.
pub fn audio_path_for(text_file: &Path) -> PathBuf {
    text_file.with_extension(AUDIO_EXTENSION)
}

/// Converts the text file into speech next to it. Returns the audio path on success.
pub async fn synthesize(provider: &dyn Provider, text_file: &Path) -> Option<PathBuf> {
    let text = match fs::read_to_string(text_file).await {
        Ok(text) => text,
        Err(err) => {
            loge(format!(
                "Error during Text-to-Speech transformation: cannot read {}: {}",
                text_file.display(),
                err
            ));
            return None;
        }
    };

    let audio_file = audio_path_for(text_file);
    match provider.speech_to_file(&text, &audio_file).await {
        Ok(bytes) => {
            logok(format!(
                "Text-to-Speech output written to file {} ({} bytes).",
                audio_file.display(),
                bytes
            ));
            Some(audio_file)
        }
        Err(err) => {
            loge(format!("Error during Text-to-Speech transformation: {}", err));
            None
        }
    }
}
