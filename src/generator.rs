use crate::api::Provider;
use crate::confirm::Confirm;
use crate::options::RunOptions;
use crate::{images, prompts, speech, text};
use crate::{loge, logi, logok, logw};
use std::path::{Path, PathBuf};
use tokio::fs;

/// What a run left on disk.
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    /// Text file available to the speech stage, if any.
    pub text_file: Option<PathBuf>,
    pub text_generated: bool,
    pub audio_file: Option<PathBuf>,
    pub audio_generated: bool,
    pub prompts: Vec<String>,
    pub images: Vec<PathBuf>,
}

async fn file_exists(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

async fn ensure_dir(path: &Path) -> anyhow::Result<()> {
    if !fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false) {
        fs::create_dir_all(path).await?;
    }
    Ok(())
}

/// Runs the text, speech, image-prompt and image stages in order.
///
/// Each stage asks for confirmation first. Stage failures are logged and only
/// affect the stages that need their output.
pub async fn run_generation(
    provider: &dyn Provider,
    confirm: &mut dyn Confirm,
    opts: &RunOptions,
) -> RunReport {
    let mut report = RunReport::default();

    let text_file = text_stage(provider, confirm, opts, &mut report).await;
    report.text_file = text_file;

    if let Some(text_file) = report.text_file.clone() {
        let audio_file = speech::audio_path_for(&text_file);
        if file_exists(&audio_file).await {
            logok(format!(
                "Corresponding voice MP3 file found: {}. It will be used.",
                audio_file.display()
            ));
            report.audio_file = Some(audio_file);
        } else if confirm.confirm("Do you want to proceed with Text-to-Speech transformation?") {
            logok("Text-to-Speech transformation selected.");
            report.audio_file = speech::synthesize(provider, &text_file).await;
            report.audio_generated = report.audio_file.is_some();
        } else {
            logi("Text-to-Speech transformation skipped.");
        }
    }

    image_stage(provider, confirm, opts, &mut report).await;

    if opts.music_file.is_some() || opts.output_file.is_some() {
        logi(format!(
            "Video assembly is not performed (music file: {}, output file: {}).",
            display_opt(opts.music_file.as_deref()),
            display_opt(opts.output_file.as_deref())
        ));
    }
    logi(format!(
        "All done. Text: {}, audio: {}, images: {}",
        display_opt(report.text_file.as_deref()),
        display_opt(report.audio_file.as_deref()),
        report.images.len()
    ));

    report
}

async fn text_stage(
    provider: &dyn Provider,
    confirm: &mut dyn Confirm,
    opts: &RunOptions,
    report: &mut RunReport,
) -> Option<PathBuf> {
    if let Some(explicit) = &opts.text_file {
        if !file_exists(explicit).await {
            logw(format!("Provided text file {} does not exist.", explicit.display()));
            return None;
        }
        logok("Using provided text file.");
        return Some(explicit.clone());
    }

    if !confirm.confirm("Do you want to generate text?") {
        logi("Text generation skipped.");
        return None;
    }

    logok("Generating text using OpenAI.");
    let generated = text::generate_text(provider, &opts.user_message).await?;
    match text::save_text(&opts.text_output_file, &generated).await {
        Ok(()) => {
            logok(format!("Generated text saved to {}", opts.text_output_file.display()));
            report.text_generated = true;
            Some(opts.text_output_file.clone())
        }
        Err(err) => {
            loge(format!("{:#}", err));
            None
        }
    }
}

async fn image_stage(
    provider: &dyn Provider,
    confirm: &mut dyn Confirm,
    opts: &RunOptions,
    report: &mut RunReport,
) {
    let folder = &opts.image_output_folder;
    logok(format!("Images will be saved in the folder: {}", folder.display()));

    if let Err(err) = ensure_dir(folder).await {
        loge(format!(
            "Cannot create image output folder {}: {:#}",
            folder.display(),
            err
        ));
        return;
    }

    if !confirm.confirm("Do you want to start the image generation process?") {
        logi("Image generation process skipped.");
        return;
    }
    logok("Image generation process selected.");

    let count = opts.image_count();
    if count < opts.requested_images {
        logw(format!(
            "Requested {} images; capped at the configured maximum of {}.",
            opts.requested_images, opts.max_images
        ));
    }

    let source = opts.text_source();
    let content = match fs::read_to_string(source).await {
        Ok(content) => content,
        Err(err) => {
            loge(format!(
                "Error: Text output file {} not found ({}).",
                source.display(),
                err
            ));
            return;
        }
    };

    let image_prompts =
        prompts::generate_image_prompts(provider, &content, count, opts.prompt_failure_policy)
            .await;

    logok("Generated Image Prompts:");
    for (i, prompt) in image_prompts.iter().enumerate() {
        println!("Prompt {}: {}", i + 1, prompt);
    }

    match images::generate_and_save_images(
        provider,
        &image_prompts,
        folder,
        opts.image_failure_policy,
    )
    .await
    {
        Ok(written) => report.images = written,
        Err(err) => loge(format!("Image generation aborted: {:#}", err)),
    }
    report.prompts = image_prompts;
}

fn display_opt(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "none".to_string())
}
