use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubflowError {
    #[error("Transcript contains no tokens")]
    EmptyTranscript,

    #[error("Transcription job failed: {0}")]
    TranscriptionJobFailed(String),

    #[error("Transcription job still running after {attempts} status checks")]
    TranscriptionTimeout { attempts: u32 },

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Translation failed: {0}")]
    TranslationService(String),

    #[error("Metadata update conflict: {0}")]
    MetadataConflict(String),

    #[error("Malformed transcript: {0}")]
    Transcript(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SubflowError>;
