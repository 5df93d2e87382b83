// WebVTT conversion
use regex::Regex;
use std::sync::OnceLock;

/// Fixed document header; the two blank lines after it are part of the
/// output contract.
const VTT_HEADER: &str = "WEBVTT\n\n\n";

/// Matches an SRT timecode line, with optional milliseconds.
fn timecode_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+):(\d+):(\d+)(?:,(\d+))?\s*--?>\s*(\d+):(\d+):(\d+)(?:,(\d+))?")
            .expect("timecode pattern is valid")
    })
}

/// Convert SRT document text to WebVTT text.
///
/// Timecode lines have their comma millisecond separators rewritten to
/// periods; every other line is copied verbatim. The conversion is
/// one-directional.
pub fn from_srt(srt: &str) -> String {
    let srt = srt.replace('\r', "");
    let mut output = String::from(VTT_HEADER);

    for line in srt.split('\n') {
        match timecode_line().captures(line) {
            Some(caps) => {
                output.push_str(&format!(
                    "{}:{}:{}.{} --> {}:{}:{}.{}\n",
                    &caps[1],
                    &caps[2],
                    &caps[3],
                    caps.get(4).map_or("000", |m| m.as_str()),
                    &caps[5],
                    &caps[6],
                    &caps[7],
                    caps.get(8).map_or("000", |m| m.as_str()),
                ));
            }
            None => {
                output.push_str(line);
                output.push('\n');
            }
        }
    }

    output.trim().to_string()
}
