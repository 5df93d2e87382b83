use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use subflow::config::Config;
use subflow::store::fs::FsObjectStore;
use subflow::store::rest::RestMetadataStore;
use subflow::transcribe::rest::RestTranscriptionService;
use subflow::translate::rest::RestTranslator;
use subflow::workflow::{Workflow, WorkflowConfig, WorkflowInput};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "subflow")]
#[command(version, about = "Generate and translate subtitles for uploaded videos")]
#[command(
    long_about = "Drives a video through transcription, cue segmentation, subtitle \
                  rendering, and optional translation, recording the produced assets \
                  against the video's metadata record."
)]
struct Cli {
    /// Video id to process
    video_id: String,

    /// Source language code of the video's speech (e.g., en-US, ja-JP)
    #[arg(short, long, default_value = "en-US")]
    source_language: String,

    /// Translate the subtitle to this language (e.g., fr, es)
    #[arg(short, long)]
    target_language: Option<String>,

    /// The video already has a source-language subtitle; skip transcription
    #[arg(long)]
    has_transcript: bool,

    /// Root directory of the local object store (overrides config)
    #[arg(long)]
    store_root: Option<PathBuf>,

    /// Disable the poll progress spinner
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = Config::load().context("Failed to load configuration")?;
    if cli.store_root.is_some() {
        config.store_root = cli.store_root.clone();
    }
    config
        .validate()
        .context("Configuration validation failed")?;

    // validate() guarantees these are set.
    let transcription_url = config.transcription_url.clone().unwrap_or_default();
    let translation_url = config.translation_url.clone().unwrap_or_default();
    let metadata_url = config.metadata_url.clone().unwrap_or_default();
    let asset_base_url = config.asset_base_url.clone().unwrap_or_default();
    let store_root = config.store_root.clone().unwrap_or_default();

    info!("Video:    {}", cli.video_id);
    info!("Language: {}", cli.source_language);
    if let Some(ref target) = cli.target_language {
        info!("Translate to: {}", target);
    }

    let workflow = Workflow::new(
        Arc::new(RestTranscriptionService::new(transcription_url)),
        Arc::new(RestTranslator::new(translation_url)),
        Arc::new(FsObjectStore::new(store_root)),
        Arc::new(RestMetadataStore::new(metadata_url)),
        WorkflowConfig {
            asset_base_url,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            max_poll_attempts: config.max_poll_attempts,
            translate_concurrency: config.translate_concurrency,
        },
    )
    .with_progress(!cli.no_progress);

    let input = WorkflowInput {
        video_id: cli.video_id,
        source_language_code: cli.source_language,
        has_transcript: cli.has_transcript,
        target_language: cli.target_language,
    };

    let output = workflow.run(&input).await?;

    info!("Subtitle: {}", output.subtitle_key);
    if let Some(ref key) = output.translated_subtitle_key {
        info!("Translated subtitle: {}", key);
    }

    Ok(())
}
