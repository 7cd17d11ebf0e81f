use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{FailurePolicy, Settings};

/// Settings with command line overrides applied.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub user_message: String,
    /// Text file supplied on the command line. Its presence skips text generation.
    pub text_file: Option<PathBuf>,
    pub text_output_file: PathBuf,
    pub music_file: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub requested_images: usize,
    pub max_images: usize,
    pub image_output_folder: PathBuf,
    pub prompt_failure_policy: FailurePolicy,
    pub image_failure_policy: FailurePolicy,
}

impl RunOptions {
    pub fn from_settings(settings: &Settings, cli: &Cli) -> Self {
        Self {
            user_message: settings.user_message.clone(),
            text_file: cli.text_file.clone(),
            text_output_file: settings.text_output_file.clone(),
            music_file: cli
                .music_file
                .clone()
                .or_else(|| settings.default_music_file.clone()),
            output_file: cli
                .output_file
                .clone()
                .or_else(|| settings.default_output_file.clone()),
            requested_images: cli.num_images.unwrap_or(settings.default_num_images),
            max_images: settings.max_num_images,
            image_output_folder: cli
                .image_output_folder
                .clone()
                .unwrap_or_else(|| settings.default_image_output_folder.clone()),
            prompt_failure_policy: settings.prompt_failure_policy,
            image_failure_policy: settings.image_failure_policy,
        }
    }

    /// Number of images to produce, capped at the configured maximum.
    pub fn image_count(&self) -> usize {
        self.requested_images.min(self.max_images)
    }

    /// The text the image stage reads from.
    pub fn text_source(&self) -> &Path {
        self.text_file.as_deref().unwrap_or(&self.text_output_file)
    }
}
