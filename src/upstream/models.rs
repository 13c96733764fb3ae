use serde::{Deserialize, Serialize};
use serde_json::json;

/// Playable audio for one video, picked from a mirror's stream listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub url: String,
    pub title: String,
    pub artist: String,
}

pub const PLACEHOLDER_VIDEO_ID: &str = "dQw4w9WgXcQ";
pub const PLACEHOLDER_TITLE: &str = "Trending temporarily unavailable";
pub const PLACEHOLDER_UPLOADER: &str = "mirrorbeat";

/// Single record served by `/trending` when no mirror answers.
pub fn trending_placeholder() -> serde_json::Value {
    json!({
        "id": PLACEHOLDER_VIDEO_ID,
        "title": PLACEHOLDER_TITLE,
        "uploader": PLACEHOLDER_UPLOADER,
    })
}
