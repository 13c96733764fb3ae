//! Lyrics lookup backed by lyrics.ovh.

pub mod ovh;

pub use ovh::LyricsOvhClient;

pub const NOT_FOUND: &str = "Lyrics not found.";

/// Lyrics text for a song, or [`NOT_FOUND`] on any miss or failure.
pub async fn fetch_lyrics(client: &LyricsOvhClient, artist: &str, title: &str) -> String {
    match client.get_lyrics(artist, title).await {
        Ok(Some(lyrics)) => lyrics,
        Ok(None) => NOT_FOUND.to_string(),
        Err(err) => {
            tracing::debug!(error = %err, artist, title, "lyrics lookup failed");
            NOT_FOUND.to_string()
        }
    }
}
