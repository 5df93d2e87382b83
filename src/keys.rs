//! Object-store key layout.
//!
//! Existing artifacts were written under these keys, so the layout is an
//! interoperability contract, not a convention.

/// Raw transcription service output for a video.
pub fn raw_transcript(video_id: &str) -> String {
    format!("transcript/{}.json", video_id)
}

/// Plain-text transcript extracted from the raw output.
pub fn plain_transcript(video_id: &str) -> String {
    format!("transcript/{}/{}.txt", video_id, video_id)
}

/// Source-language SRT subtitle.
pub fn subtitle(video_id: &str) -> String {
    format!("subtitle/{}/{}.srt", video_id, video_id)
}

/// Source-language VTT caption.
pub fn caption(video_id: &str) -> String {
    format!("subtitle/{}/{}.vtt", video_id, video_id)
}

/// Translated SRT subtitle for a target language.
pub fn translated_subtitle(video_id: &str, language: &str) -> String {
    format!("subtitle/{}/{}_{}.srt", video_id, video_id, language)
}

/// Translated VTT caption for a target language.
pub fn translated_caption(video_id: &str, language: &str) -> String {
    format!("subtitle/{}/{}_{}.vtt", video_id, video_id, language)
}

/// Uploaded source media for a video.
pub fn source_media(video_id: &str) -> String {
    format!("video/{}.mp4", video_id)
}

/// Public URL for an artifact key.
pub fn asset_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key)
}
