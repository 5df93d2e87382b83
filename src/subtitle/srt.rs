// SRT subtitle format
use super::Cue;
use std::time::Duration;

/// Render cues as an SRT document.
pub fn render(cues: &[Cue]) -> String {
    let mut output = String::new();

    for cue in cues {
        output.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            cue.index,
            format_timecode(cue.start),
            format_timecode(cue.end),
            cue.text
        ));
    }

    output
}

/// `HH:MM:SS,mmm`, zero-padded.
pub fn format_timecode(seconds: f64) -> String {
    let d = Duration::from_secs_f64(seconds.max(0.0));
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    let millis = d.subsec_millis();
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// One parsed SRT block: `[index, timecode, text]`. Lines past the first are
/// optional so malformed or trailing-empty blocks round-trip untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct SrtBlock {
    pub index: String,
    pub timecode: Option<String>,
    pub text: Option<String>,
}

impl SrtBlock {
    pub fn render(&self) -> String {
        let mut out = self.index.clone();
        if let Some(ref timecode) = self.timecode {
            out.push('\n');
            out.push_str(timecode);
        }
        if let Some(ref text) = self.text {
            out.push('\n');
            out.push_str(text);
        }
        out
    }
}

/// Split an SRT document into blank-line-separated blocks.
pub fn parse_blocks(srt: &str) -> Vec<SrtBlock> {
    srt.split("\n\n")
        .map(|chunk| {
            let mut lines = chunk.splitn(3, '\n');
            SrtBlock {
                index: lines.next().unwrap_or_default().to_string(),
                timecode: lines.next().map(str::to_string),
                text: lines.next().map(str::to_string),
            }
        })
        .collect()
}
