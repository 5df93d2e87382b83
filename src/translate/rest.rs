//! REST client for the translation service.

use crate::error::{Result, SubflowError};
use crate::translate::Translator;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Client for a translation service exposing `POST /translate`. The source
/// language is always auto-detected.
pub struct RestTranslator {
    client: reqwest::Client,
    base_url: String,
}

impl RestTranslator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    source_language: &'a str,
    target_language: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translated_text: String,
}

#[async_trait]
impl Translator for RestTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let url = format!("{}/translate", self.base_url.trim_end_matches('/'));
        debug!("Translating {} byte(s) to {}", text.len(), target_language);

        let response = self
            .client
            .post(&url)
            .json(&TranslateRequest {
                text,
                source_language: "auto",
                target_language,
            })
            .send()
            .await
            .map_err(|e| SubflowError::TranslationService(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SubflowError::TranslationService(e.to_string()))?;

        if !status.is_success() {
            return Err(SubflowError::TranslationService(format!(
                "translation API error ({}): {}",
                status, body
            )));
        }

        let parsed: TranslateResponse = serde_json::from_str(&body)
            .map_err(|e| SubflowError::TranslationService(e.to_string()))?;

        Ok(parsed.translated_text)
    }
}
