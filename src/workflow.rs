//! Finite-state controller for the subtitle workflow.
//!
//! The workflow drives one video from uploaded media to recorded subtitle
//! assets: submit a transcription job, poll it to completion, segment the
//! transcript into cues, persist SRT/VTT artifacts, then optionally
//! re-localize the subtitle for a target language. Each transition is
//! explicit so the poll bound and the job-failure path are part of the
//! machine rather than implied by a call chain.

use crate::error::{Result, SubflowError};
use crate::keys;
use crate::metadata::upsert_language_asset;
use crate::store::{LanguageAsset, MetadataStore, ObjectStore, VideoUpdate};
use crate::subtitle::{segment::segment, vtt, SubtitleDocument};
use crate::transcribe::{JobStatus, TranscriptionService};
use crate::translate::{translate_document, Translator};
use crate::transcript;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tunables for one workflow run.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Public URL prefix recorded in metadata for persisted artifacts.
    pub asset_base_url: String,
    /// Wait between transcription job status checks.
    pub poll_interval: Duration,
    /// Status checks before the workflow gives up on a running job.
    pub max_poll_attempts: u32,
    /// Concurrent per-cue translation calls.
    pub translate_concurrency: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            asset_base_url: String::new(),
            poll_interval: Duration::from_secs(30),
            max_poll_attempts: 20,
            translate_concurrency: 4,
        }
    }
}

/// Step input payload. Everything a step needs to resume is carried here,
/// never in memory between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowInput {
    pub video_id: String,
    pub source_language_code: String,
    #[serde(default)]
    pub has_transcript: bool,
    #[serde(default)]
    pub target_language: Option<String>,
}

/// Success payload: the input echoed back plus the produced artifact keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowOutput {
    pub video_id: String,
    pub source_language_code: String,
    pub has_transcript: bool,
    #[serde(default)]
    pub target_language: Option<String>,
    pub subtitle_key: String,
    #[serde(default)]
    pub translated_subtitle_key: Option<String>,
}

/// Workflow states. `Done` and `Failed` are terminal.
#[derive(Debug)]
pub enum State {
    Start,
    Transcribing { job_id: String },
    Polling { job_id: String, attempt: u32 },
    Segmenting,
    Translating { subtitle_key: String },
    Done(WorkflowOutput),
    Failed(SubflowError),
}

pub struct Workflow {
    transcription: Arc<dyn TranscriptionService>,
    translator: Arc<dyn Translator>,
    objects: Arc<dyn ObjectStore>,
    metadata: Arc<dyn MetadataStore>,
    config: WorkflowConfig,
    show_progress: bool,
}

impl Workflow {
    pub fn new(
        transcription: Arc<dyn TranscriptionService>,
        translator: Arc<dyn Translator>,
        objects: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            transcription,
            translator,
            objects,
            metadata,
            config,
            show_progress: true,
        }
    }

    /// Enable or disable the poll spinner.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Drive the machine from `Start` to a terminal state. The only
    /// suspension point is the wait before each status check.
    pub async fn run(&self, input: &WorkflowInput) -> Result<WorkflowOutput> {
        let mut state = State::Start;
        let mut spinner: Option<ProgressBar> = None;

        loop {
            if let State::Polling { attempt, .. } = &state {
                if self.show_progress && spinner.is_none() {
                    spinner = Some(poll_spinner());
                }
                if let Some(ref pb) = spinner {
                    pb.set_message(format!(
                        "Waiting for transcription job (check {}/{})",
                        attempt + 1,
                        self.config.max_poll_attempts
                    ));
                }
                tokio::time::sleep(self.config.poll_interval).await;
            } else if let Some(pb) = spinner.take() {
                pb.finish_and_clear();
            }

            match self.step(state, input).await {
                State::Done(output) => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    info!("Workflow complete for video {}", output.video_id);
                    return Ok(output);
                }
                State::Failed(err) => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    warn!("Workflow failed for video {}: {}", input.video_id, err);
                    return Err(err);
                }
                next => state = next,
            }
        }
    }

    /// Apply one transition. Errors become the terminal `Failed` state with
    /// the captured cause.
    pub async fn step(&self, state: State, input: &WorkflowInput) -> State {
        match self.advance(state, input).await {
            Ok(next) => next,
            Err(err) => State::Failed(err),
        }
    }

    async fn advance(&self, state: State, input: &WorkflowInput) -> Result<State> {
        debug!("Advancing from {:?}", state);

        match state {
            State::Start => self.start(input).await,
            // Submission succeeded; the first status check happens after the
            // poll wait, like every later one.
            State::Transcribing { job_id } => Ok(State::Polling { job_id, attempt: 0 }),
            State::Polling { job_id, attempt } => self.poll(job_id, attempt).await,
            State::Segmenting => self.segmenting(input).await,
            State::Translating { subtitle_key } => self.translating(input, subtitle_key).await,
            terminal @ (State::Done(_) | State::Failed(_)) => Ok(terminal),
        }
    }

    async fn start(&self, input: &WorkflowInput) -> Result<State> {
        if input.has_transcript {
            let subtitle_key = keys::subtitle(&input.video_id);
            info!(
                "Video {} already has a transcript, skipping transcription",
                input.video_id
            );
            return match input.target_language {
                Some(_) => Ok(State::Translating { subtitle_key }),
                None => Ok(State::Done(self.output(input, subtitle_key, None))),
            };
        }

        let media_key = keys::source_media(&input.video_id);
        let job_id = self
            .transcription
            .submit(&media_key, &input.source_language_code)
            .await?;
        info!(
            "Submitted transcription job {} for video {}",
            job_id, input.video_id
        );

        Ok(State::Transcribing { job_id })
    }

    /// Read-only: queries job status and routes on it.
    async fn poll(&self, job_id: String, attempt: u32) -> Result<State> {
        let job = self.transcription.status(&job_id).await?;

        match job.status {
            JobStatus::Completed => {
                info!("Transcription job {} completed", job_id);
                Ok(State::Segmenting)
            }
            JobStatus::Failed => Err(SubflowError::TranscriptionJobFailed(
                job.failure_reason
                    .unwrap_or_else(|| "no failure reason reported".to_string()),
            )),
            JobStatus::Running => {
                let attempts = attempt + 1;
                if attempts >= self.config.max_poll_attempts {
                    return Err(SubflowError::TranscriptionTimeout { attempts });
                }
                debug!("Job {} still running after {} check(s)", job_id, attempts);
                Ok(State::Polling {
                    job_id,
                    attempt: attempts,
                })
            }
        }
    }

    async fn segmenting(&self, input: &WorkflowInput) -> Result<State> {
        let video_id = &input.video_id;
        let raw = self.objects.get(&keys::raw_transcript(video_id)).await?;
        let output = transcript::parse_output(&raw)?;

        let transcript_key = keys::plain_transcript(video_id);
        self.objects
            .put(&transcript_key, output.transcript.into_bytes())
            .await?;

        let language = primary_language(&input.source_language_code);
        let cues = segment(&output.tokens)?;
        info!(
            "Segmented {} token(s) into {} cue(s) for video {}",
            output.tokens.len(),
            cues.len(),
            video_id
        );

        let document = SubtitleDocument::new(language, cues);
        let srt = document.to_srt();

        let subtitle_key = keys::subtitle(video_id);
        let caption_key = keys::caption(video_id);
        self.objects
            .put(&subtitle_key, srt.clone().into_bytes())
            .await?;
        self.objects
            .put(&caption_key, vtt::from_srt(&srt).into_bytes())
            .await?;

        upsert_language_asset(
            self.metadata.as_ref(),
            video_id,
            LanguageAsset {
                language: document.language,
                subtitle_url: self.asset_url(&subtitle_key),
                caption_url: self.asset_url(&caption_key),
            },
            VideoUpdate {
                has_transcript: Some(true),
                source_transcript_url: Some(self.asset_url(&transcript_key)),
                ..Default::default()
            },
        )
        .await?;

        match input.target_language {
            Some(_) => Ok(State::Translating { subtitle_key }),
            None => Ok(State::Done(self.output(input, subtitle_key, None))),
        }
    }

    async fn translating(&self, input: &WorkflowInput, subtitle_key: String) -> Result<State> {
        let target = match input.target_language.as_deref() {
            Some(target) => target,
            None => return Ok(State::Done(self.output(input, subtitle_key, None))),
        };
        let video_id = &input.video_id;

        let source_bytes = self.objects.get(&subtitle_key).await?;
        let source = String::from_utf8_lossy(&source_bytes);

        let translated = translate_document(
            &source,
            target,
            self.translator.as_ref(),
            self.config.translate_concurrency,
        )
        .await?;
        info!("Translated subtitle for video {} to {}", video_id, target);

        let translated_key = keys::translated_subtitle(video_id, target);
        let translated_caption_key = keys::translated_caption(video_id, target);
        self.objects
            .put(&translated_key, translated.clone().into_bytes())
            .await?;
        self.objects
            .put(&translated_caption_key, vtt::from_srt(&translated).into_bytes())
            .await?;

        upsert_language_asset(
            self.metadata.as_ref(),
            video_id,
            LanguageAsset {
                language: target.to_string(),
                subtitle_url: self.asset_url(&translated_key),
                caption_url: self.asset_url(&translated_caption_key),
            },
            VideoUpdate::default(),
        )
        .await?;

        Ok(State::Done(self.output(
            input,
            subtitle_key,
            Some(translated_key),
        )))
    }

    fn asset_url(&self, key: &str) -> String {
        keys::asset_url(&self.config.asset_base_url, key)
    }

    fn output(
        &self,
        input: &WorkflowInput,
        subtitle_key: String,
        translated_subtitle_key: Option<String>,
    ) -> WorkflowOutput {
        WorkflowOutput {
            video_id: input.video_id.clone(),
            source_language_code: input.source_language_code.clone(),
            has_transcript: true,
            target_language: input.target_language.clone(),
            subtitle_key,
            translated_subtitle_key,
        }
    }
}

/// The asset language is the primary subtag of the transcription language
/// code: `en-US` subtitles are recorded as `en`.
fn primary_language(language_code: &str) -> &str {
    language_code.split('-').next().unwrap_or(language_code)
}

fn poll_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
