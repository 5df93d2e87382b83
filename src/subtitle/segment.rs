//! Converts a time-stamped token stream into subtitle cues.
//!
//! Cues close on punctuation, or when a token would stretch the running cue
//! past [`MAX_CUE_SPAN_SECS`]. Both the threshold and the separator handling
//! are exact contracts: existing subtitle artifacts were produced with them,
//! and regenerating a video must yield identical cues.

use super::Cue;
use crate::error::{Result, SubflowError};
use crate::transcript::{Token, TokenKind};

/// A cue may not span more than this many seconds. A token whose end time
/// exceeds the running cue start by strictly more than this closes the cue;
/// exactly this value does not.
pub const MAX_CUE_SPAN_SECS: f64 = 5.0;

/// Words are joined with a single space; punctuation strips it back off.
const SEPARATOR: char = ' ';

/// Segment an ordered token stream into ordered cues.
pub fn segment(tokens: &[Token]) -> Result<Vec<Cue>> {
    let first = tokens.first().ok_or(SubflowError::EmptyTranscript)?;

    let mut cues: Vec<Cue> = Vec::new();
    let mut buffer = String::new();
    let mut cue_start = first.start;

    for (i, token) in tokens.iter().enumerate() {
        let previous_end = if i > 0 { tokens[i - 1].end } else { cue_start };

        match token.kind {
            TokenKind::Punctuation => {
                // The mark attaches directly to the preceding word.
                if buffer.ends_with(SEPARATOR) {
                    buffer.pop();
                }
                buffer.push_str(&token.content);
                close_cue(&mut cues, cue_start, previous_end, &buffer);
                buffer.clear();
                if let Some(next) = tokens.get(i + 1) {
                    cue_start = next.start;
                }
            }
            TokenKind::Word if token.end - cue_start > MAX_CUE_SPAN_SECS => {
                if !buffer.is_empty() {
                    close_cue(&mut cues, cue_start, previous_end, &buffer);
                    buffer.clear();
                }
                buffer.push_str(&token.content);
                buffer.push(SEPARATOR);
                cue_start = token.start;
            }
            TokenKind::Word => {
                buffer.push_str(&token.content);
                buffer.push(SEPARATOR);
            }
        }
    }

    if !buffer.is_empty() {
        if let Some(last) = tokens.last() {
            let end = match last.kind {
                TokenKind::Word => last.end,
                TokenKind::Punctuation => tokens
                    .len()
                    .checked_sub(2)
                    .map(|i| tokens[i].end)
                    .unwrap_or(last.end),
            };
            close_cue(&mut cues, cue_start, end, &buffer);
        }
    }

    Ok(cues)
}

fn close_cue(cues: &mut Vec<Cue>, start: f64, end: f64, text: &str) {
    cues.push(Cue {
        index: cues.len() + 1,
        start,
        end,
        text: text.trim_end_matches(SEPARATOR).to_string(),
    });
}
