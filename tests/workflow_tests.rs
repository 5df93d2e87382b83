//! End-to-end workflow runs against in-memory stores and scripted services.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use subflow::error::{Result, SubflowError};
use subflow::keys;
use subflow::store::memory::{MemoryMetadataStore, MemoryObjectStore};
use subflow::store::{MetadataStore, ObjectStore, VideoRecord};
use subflow::transcribe::{JobStatus, TranscriptionJob, TranscriptionService};
use subflow::translate::Translator;
use subflow::workflow::{Workflow, WorkflowConfig, WorkflowInput};

const RAW_TRANSCRIPT: &str = r#"{
    "jobName": "job-1",
    "results": {
        "transcripts": [{"transcript": "Hello, world."}],
        "items": [
            {"type": "pronunciation", "start_time": "0.0", "end_time": "1.0",
             "alternatives": [{"confidence": "0.99", "content": "Hello"}]},
            {"type": "punctuation",
             "alternatives": [{"confidence": "0.0", "content": ","}]},
            {"type": "pronunciation", "start_time": "1.5", "end_time": "2.5",
             "alternatives": [{"confidence": "0.98", "content": "world"}]},
            {"type": "punctuation",
             "alternatives": [{"confidence": "0.0", "content": "."}]}
        ]
    }
}"#;

enum JobScript {
    CompleteAfter(u32),
    NeverFinish,
    Fail(&'static str),
}

/// Transcription service that plays a fixed script and counts calls.
struct ScriptedTranscription {
    script: JobScript,
    submit_calls: AtomicU32,
    status_calls: AtomicU32,
}

impl ScriptedTranscription {
    fn new(script: JobScript) -> Arc<Self> {
        Arc::new(Self {
            script,
            submit_calls: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl TranscriptionService for ScriptedTranscription {
    async fn submit(&self, _media_key: &str, _language_code: &str) -> Result<String> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        Ok("job-1".to_string())
    }

    async fn status(&self, job_id: &str) -> Result<TranscriptionJob> {
        let calls = self.status_calls.fetch_add(1, Ordering::SeqCst) + 1;

        let (status, failure_reason) = match self.script {
            JobScript::CompleteAfter(n) if calls >= n => (JobStatus::Completed, None),
            JobScript::CompleteAfter(_) | JobScript::NeverFinish => (JobStatus::Running, None),
            JobScript::Fail(reason) => (JobStatus::Failed, Some(reason.to_string())),
        };

        Ok(TranscriptionJob {
            id: job_id.to_string(),
            status,
            output_location: None,
            failure_reason,
        })
    }
}

/// Translator that tags each text with the target language.
struct TaggingTranslator;

#[async_trait]
impl Translator for TaggingTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        Ok(format!("[{}] {}", target_language, text))
    }
}

struct FailingTranslator;

#[async_trait]
impl Translator for FailingTranslator {
    async fn translate(&self, _text: &str, _target_language: &str) -> Result<String> {
        Err(SubflowError::TranslationService(
            "translation service down".to_string(),
        ))
    }
}

struct Harness {
    transcription: Arc<ScriptedTranscription>,
    objects: Arc<MemoryObjectStore>,
    metadata: Arc<MemoryMetadataStore>,
}

impl Harness {
    fn new(script: JobScript) -> Self {
        let harness = Self {
            transcription: ScriptedTranscription::new(script),
            objects: Arc::new(MemoryObjectStore::new()),
            metadata: Arc::new(MemoryMetadataStore::new()),
        };
        harness.metadata.insert(VideoRecord {
            video_id: "v1".to_string(),
            ..Default::default()
        });
        harness
    }

    async fn seed_raw_transcript(&self) {
        self.objects
            .put(&keys::raw_transcript("v1"), RAW_TRANSCRIPT.as_bytes().to_vec())
            .await
            .unwrap();
    }

    async fn seed_subtitle(&self, srt: &str) {
        self.objects
            .put(&keys::subtitle("v1"), srt.as_bytes().to_vec())
            .await
            .unwrap();
    }

    fn workflow(&self, translator: Arc<dyn Translator>, max_poll_attempts: u32) -> Workflow {
        Workflow::new(
            self.transcription.clone(),
            translator,
            self.objects.clone(),
            self.metadata.clone(),
            WorkflowConfig {
                asset_base_url: "https://cdn.test".to_string(),
                poll_interval: Duration::from_millis(1),
                max_poll_attempts,
                translate_concurrency: 2,
            },
        )
        .with_progress(false)
    }
}

fn input(has_transcript: bool, target_language: Option<&str>) -> WorkflowInput {
    WorkflowInput {
        video_id: "v1".to_string(),
        source_language_code: "en-US".to_string(),
        has_transcript,
        target_language: target_language.map(str::to_string),
    }
}

#[tokio::test]
async fn test_full_run_produces_subtitles_and_metadata() {
    let harness = Harness::new(JobScript::CompleteAfter(2));
    harness.seed_raw_transcript().await;

    let workflow = harness.workflow(Arc::new(TaggingTranslator), 5);
    let output = workflow.run(&input(false, None)).await.unwrap();

    assert_eq!(output.subtitle_key, "subtitle/v1/v1.srt");
    assert!(output.translated_subtitle_key.is_none());
    assert_eq!(harness.transcription.submit_calls.load(Ordering::SeqCst), 1);
    assert_eq!(harness.transcription.status_calls.load(Ordering::SeqCst), 2);

    assert!(harness.objects.contains("transcript/v1/v1.txt"));
    assert!(harness.objects.contains("subtitle/v1/v1.srt"));
    assert!(harness.objects.contains("subtitle/v1/v1.vtt"));

    let transcript = harness.objects.get("transcript/v1/v1.txt").await.unwrap();
    assert_eq!(transcript, b"Hello, world.");

    let srt = String::from_utf8(harness.objects.get("subtitle/v1/v1.srt").await.unwrap()).unwrap();
    assert!(srt.contains("Hello,"));
    assert!(srt.contains("world."));

    let vtt = String::from_utf8(harness.objects.get("subtitle/v1/v1.vtt").await.unwrap()).unwrap();
    assert!(vtt.starts_with("WEBVTT"));

    let record = harness.metadata.get("v1").await.unwrap();
    assert!(record.has_transcript);
    assert_eq!(
        record.source_transcript_url.as_deref(),
        Some("https://cdn.test/transcript/v1/v1.txt")
    );
    assert_eq!(record.languages.len(), 1);
    assert_eq!(record.languages[0].language, "en");
    assert_eq!(
        record.languages[0].subtitle_url,
        "https://cdn.test/subtitle/v1/v1.srt"
    );
}

#[tokio::test]
async fn test_full_run_with_translation() {
    let harness = Harness::new(JobScript::CompleteAfter(1));
    harness.seed_raw_transcript().await;

    let workflow = harness.workflow(Arc::new(TaggingTranslator), 5);
    let output = workflow.run(&input(false, Some("fr"))).await.unwrap();

    assert_eq!(
        output.translated_subtitle_key.as_deref(),
        Some("subtitle/v1/v1_fr.srt")
    );
    assert!(harness.objects.contains("subtitle/v1/v1_fr.srt"));
    assert!(harness.objects.contains("subtitle/v1/v1_fr.vtt"));

    let translated =
        String::from_utf8(harness.objects.get("subtitle/v1/v1_fr.srt").await.unwrap()).unwrap();
    assert!(translated.contains("[fr]"));
    // Timecodes come through untouched.
    assert!(translated.contains("-->"));

    let record = harness.metadata.get("v1").await.unwrap();
    let mut languages: Vec<&str> = record.languages.iter().map(|a| a.language.as_str()).collect();
    languages.sort_unstable();
    assert_eq!(languages, ["en", "fr"]);
}

#[tokio::test]
async fn test_existing_transcript_skips_transcription() {
    let harness = Harness::new(JobScript::NeverFinish);
    harness
        .seed_subtitle("1\n00:00:00,000 --> 00:00:01,000\nHello.\n\n")
        .await;

    let workflow = harness.workflow(Arc::new(TaggingTranslator), 5);
    let output = workflow.run(&input(true, Some("es"))).await.unwrap();

    assert_eq!(harness.transcription.submit_calls.load(Ordering::SeqCst), 0);
    assert_eq!(harness.transcription.status_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        output.translated_subtitle_key.as_deref(),
        Some("subtitle/v1/v1_es.srt")
    );
    assert!(harness.objects.contains("subtitle/v1/v1_es.srt"));
}

#[tokio::test]
async fn test_existing_transcript_without_target_is_a_no_op() {
    let harness = Harness::new(JobScript::NeverFinish);

    let workflow = harness.workflow(Arc::new(TaggingTranslator), 5);
    let output = workflow.run(&input(true, None)).await.unwrap();

    assert_eq!(output.subtitle_key, "subtitle/v1/v1.srt");
    assert_eq!(harness.transcription.submit_calls.load(Ordering::SeqCst), 0);
    assert!(harness.objects.keys().is_empty());
}

#[tokio::test]
async fn test_job_failure_surfaces_reason() {
    let harness = Harness::new(JobScript::Fail("bad audio track"));

    let workflow = harness.workflow(Arc::new(TaggingTranslator), 5);
    let err = workflow.run(&input(false, None)).await.unwrap_err();

    match err {
        SubflowError::TranscriptionJobFailed(reason) => {
            assert_eq!(reason, "bad audio track");
        }
        other => panic!("expected TranscriptionJobFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_poll_bound_times_out() {
    let harness = Harness::new(JobScript::NeverFinish);

    let workflow = harness.workflow(Arc::new(TaggingTranslator), 2);
    let err = workflow.run(&input(false, None)).await.unwrap_err();

    assert!(matches!(
        err,
        SubflowError::TranscriptionTimeout { attempts: 2 }
    ));
    assert_eq!(harness.transcription.status_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_translation_leaves_no_trace() {
    let harness = Harness::new(JobScript::NeverFinish);
    harness
        .seed_subtitle("1\n00:00:00,000 --> 00:00:01,000\nHello.\n\n")
        .await;
    let version_before = harness.metadata.get("v1").await.unwrap().version;

    let workflow = harness.workflow(Arc::new(FailingTranslator), 5);
    let err = workflow.run(&input(true, Some("fr"))).await.unwrap_err();

    assert!(matches!(err, SubflowError::TranslationService(_)));
    assert!(!harness.objects.contains("subtitle/v1/v1_fr.srt"));
    assert!(!harness.objects.contains("subtitle/v1/v1_fr.vtt"));

    let record = harness.metadata.get("v1").await.unwrap();
    assert_eq!(record.version, version_before);
    assert!(record.languages.is_empty());
}

#[tokio::test]
async fn test_repeat_translation_overwrites_single_asset() {
    let harness = Harness::new(JobScript::NeverFinish);
    harness
        .seed_subtitle("1\n00:00:00,000 --> 00:00:01,000\nHello.\n\n")
        .await;

    let workflow = harness.workflow(Arc::new(TaggingTranslator), 5);
    workflow.run(&input(true, Some("fr"))).await.unwrap();
    workflow.run(&input(true, Some("fr"))).await.unwrap();

    let record = harness.metadata.get("v1").await.unwrap();
    assert_eq!(record.languages.len(), 1);
    assert_eq!(record.languages[0].language, "fr");
}

#[tokio::test]
async fn test_missing_raw_transcript_fails() {
    let harness = Harness::new(JobScript::CompleteAfter(1));
    // No raw transcript seeded.

    let workflow = harness.workflow(Arc::new(TaggingTranslator), 5);
    let err = workflow.run(&input(false, None)).await.unwrap_err();

    assert!(matches!(err, SubflowError::ArtifactNotFound(_)));
}
