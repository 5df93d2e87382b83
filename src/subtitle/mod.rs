pub mod segment;
pub mod srt;
pub mod vtt;

/// One timed subtitle entry. Indices are dense starting at 1; spans never
/// overlap and never decrease across a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Ordered cue sequence for one language.
#[derive(Debug, Clone)]
pub struct SubtitleDocument {
    pub language: String,
    pub cues: Vec<Cue>,
}

impl SubtitleDocument {
    pub fn new(language: impl Into<String>, cues: Vec<Cue>) -> Self {
        Self {
            language: language.into(),
            cues,
        }
    }

    pub fn to_srt(&self) -> String {
        srt::render(&self.cues)
    }
}
