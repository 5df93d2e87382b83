//! Parsing of raw transcription service output into time-stamped tokens.
//!
//! The service emits a JSON document with the full transcript text plus one
//! item per spoken word or punctuation mark. Times arrive as decimal strings
//! and punctuation items may omit them entirely; the parser fills the gap
//! with the previous item's end time so every [`Token`] carries a span.

use crate::error::{Result, SubflowError};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Punctuation,
}

/// One transcribed unit with its time span, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub content: String,
    pub kind: TokenKind,
    pub start: f64,
    pub end: f64,
}

impl Token {
    pub fn word(content: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            content: content.into(),
            kind: TokenKind::Word,
            start,
            end,
        }
    }

    pub fn punctuation(content: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            content: content.into(),
            kind: TokenKind::Punctuation,
            start,
            end,
        }
    }
}

/// Parsed transcription output: the plain transcript plus the token stream.
#[derive(Debug, Clone)]
pub struct TranscriptionOutput {
    pub transcript: String,
    pub tokens: Vec<Token>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    results: RawResults,
}

#[derive(Debug, Deserialize)]
struct RawResults {
    #[serde(default)]
    transcripts: Vec<RawTranscript>,
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawTranscript {
    transcript: String,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    alternatives: Vec<RawAlternative>,
    #[serde(default, deserialize_with = "seconds_opt")]
    start_time: Option<f64>,
    #[serde(default, deserialize_with = "seconds_opt")]
    end_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawAlternative {
    content: String,
}

/// Accepts `"1.23"` or `1.23`; the service encodes times as strings.
fn seconds_opt<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Parse the raw transcription payload fetched from the object store.
pub fn parse_output(bytes: &[u8]) -> Result<TranscriptionOutput> {
    let raw: RawOutput = serde_json::from_slice(bytes)?;

    let transcript = raw
        .results
        .transcripts
        .into_iter()
        .next()
        .map(|t| t.transcript)
        .unwrap_or_default();

    let mut tokens = Vec::with_capacity(raw.results.items.len());
    let mut last_end = 0.0_f64;

    for item in raw.results.items {
        let content = item
            .alternatives
            .into_iter()
            .next()
            .map(|a| a.content)
            .ok_or_else(|| SubflowError::Transcript("item has no alternatives".to_string()))?;

        let kind = if item.kind == "punctuation" {
            TokenKind::Punctuation
        } else {
            TokenKind::Word
        };

        let start = item.start_time.unwrap_or(last_end);
        let end = item.end_time.unwrap_or(start);
        last_end = end;

        tokens.push(Token {
            content,
            kind,
            start,
            end,
        });
    }

    Ok(TranscriptionOutput { transcript, tokens })
}
