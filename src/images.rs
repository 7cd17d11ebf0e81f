use crate::api::Provider;
use crate::config::FailurePolicy;
use crate::{loge, logok};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

pub fn image_file_name(index: usize) -> String {
    format!("image_{}.png", index)
}

/// Deletes everything inside `dir_path`, leaving the folder itself in place.
pub async fn clear_directory_contents(dir_path: &Path) -> Result<()> {
    if !fs::metadata(dir_path).await.map(|m| m.is_dir()).unwrap_or(false) {
        return Ok(());
    }

    for entry in WalkDir::new(dir_path).min_depth(1).contents_first(true) {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir_path.display()))?;
        let path = entry.path();
        if entry.file_type().is_dir() {
            fs::remove_dir(path)
                .await
                .with_context(|| format!("Failed to remove dir {}", path.display()))?;
        } else {
            fs::remove_file(path)
                .await
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }

    Ok(())
}

/// Empties `folder`, then generates and downloads one image per prompt as `image_<i>.png`.
///
/// Returns the files that were written. Per-image failures are logged; whether the
/// remaining prompts are still attempted depends on `policy`. Failing to empty the
/// folder is an error and nothing is generated.
pub async fn generate_and_save_images(
    provider: &dyn Provider,
    prompts: &[String],
    folder: &Path,
    policy: FailurePolicy,
) -> Result<Vec<PathBuf>> {
    clear_directory_contents(folder).await?;

    let mut written = Vec::with_capacity(prompts.len());
    for (idx, prompt) in prompts.iter().enumerate() {
        let index = idx + 1;
        match generate_one(provider, prompt, &folder.join(image_file_name(index))).await {
            Ok(path) => {
                logok(format!("Image {} generated and saved in {}", index, folder.display()));
                written.push(path);
            }
            Err(err) => {
                loge(format!("Error during image generation for prompt {}: {:#}", index, err));
                if policy == FailurePolicy::Abort {
                    break;
                }
            }
        }
    }

    Ok(written)
}

async fn generate_one(provider: &dyn Provider, prompt: &str, dest: &Path) -> Result<PathBuf> {
    let url = provider
        .image_url(prompt)
        .await
        .context("image generation request failed")?;
    let bytes = provider
        .download(&url)
        .await
        .with_context(|| format!("Error downloading image {}", url))?;
    fs::write(dest, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", dest.display()))?;

    logok(format!("Image downloaded and saved to {}", dest.display()));
    Ok(dest.to_path_buf())
}
