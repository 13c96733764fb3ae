//! lyrics.ovh API client
//!
//! Plain-text lyrics keyed by artist and title.
//! API Documentation: https://lyricsovh.docs.apiary.io

use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

/// lyrics.ovh API response. Misses come back as `{"error": "..."}`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct OvhResponse {
    #[serde(default)]
    pub lyrics: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    pub error: Option<String>,
}

/// lyrics.ovh API client
#[derive(Debug, Clone)]
pub struct LyricsOvhClient {
    client: reqwest::Client,
    base_url: String,
}

impl LyricsOvhClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.lyrics.ovh";
    const USER_AGENT: &'static str = "mirrorbeat/0.1.0";

    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .timeout(timeout)
            .build()
            .context("build lyrics client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Single lookup, no retry. The body is decoded whatever the status, so
    /// a 404 simply yields `None`.
    pub async fn get_lyrics(&self, artist: &str, title: &str) -> anyhow::Result<Option<String>> {
        let url = format!(
            "{}/v1/{}/{}",
            self.base_url,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("send lyrics request")?;
        let body: OvhResponse = response.json().await.context("parse lyrics json")?;

        Ok(body.lyrics.filter(|l| !l.is_empty()))
    }
}
