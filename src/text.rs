use crate::api::Provider;
use crate::loge;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

pub const NARRATION_SYSTEM_PROMPT: &str =
    "You are a helpful assistant which is able to generate guided meditations as text.";

/// Asks the provider for narration text. Provider failures and empty replies are logged and yield `None`.
pub async fn generate_text(provider: &dyn Provider, user_message: &str) -> Option<String> {
    match provider.chat(NARRATION_SYSTEM_PROMPT, user_message, None).await {
        Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Ok(_) => {
            loge("Error while generating text with OpenAI: empty completion");
            None
        }
        Err(err) => {
            loge(format!("Error while generating text with OpenAI: {}", err));
            None
        }
    }
}

pub async fn save_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create dir {}", parent.display()))?;
    }
    fs::write(path, text)
        .await
        .with_context(|| format!("Failed to write text to {}", path.display()))
}
