use aividgen::api::openai::OpenAiClient;
use aividgen::cli::Cli;
use aividgen::config::{self, Settings};
use aividgen::confirm::{AssumeYes, Confirm, StdinConfirm};
use aividgen::generator::run_generation;
use aividgen::options::RunOptions;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Both checks happen before the HTTP client exists.
    let api_key = config::api_key_from_env()?;
    let settings = Settings::load(&cli.settings).await?;
    let opts = RunOptions::from_settings(&settings, &cli);

    let provider = OpenAiClient::new(api_key, settings.openai.clone())?;
    let mut confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinConfirm)
    };

    run_generation(&provider, confirm.as_mut(), &opts).await;
    Ok(())
}
