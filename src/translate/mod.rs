pub mod rest;

use crate::error::Result;
use crate::subtitle::srt::{parse_blocks, SrtBlock};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate one piece of text; the source language is auto-detected.
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

/// Re-localize an SRT document cue by cue.
///
/// Indices and timecodes are preserved unchanged; blocks with no text pass
/// through verbatim. The stage is atomic: the first failed cue aborts the
/// whole document, so a partially translated result never escapes. Calls run
/// with bounded concurrency but output order always matches input order.
pub async fn translate_document(
    source: &str,
    target_language: &str,
    translator: &dyn Translator,
    concurrency: usize,
) -> Result<String> {
    let blocks = parse_blocks(source);

    let cue_count = blocks
        .iter()
        .filter(|b| has_text(b))
        .count();
    debug!(
        "Translating {} cue(s) to {} ({} block(s) total)",
        cue_count,
        target_language,
        blocks.len()
    );

    let translated: Vec<String> = stream::iter(blocks)
        .map(|block| async move {
            if !has_text(&block) {
                return Ok::<String, crate::error::SubflowError>(block.render());
            }
            let text = block.text.as_deref().unwrap_or_default();
            let translated = translator.translate(text, target_language).await?;
            let localized = SrtBlock {
                index: block.index,
                timecode: block.timecode,
                text: Some(translated),
            };
            Ok(localized.render())
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    Ok(translated.join("\n\n"))
}

fn has_text(block: &SrtBlock) -> bool {
    block
        .text
        .as_deref()
        .map(|t| !t.trim().is_empty())
        .unwrap_or(false)
}
