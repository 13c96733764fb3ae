use super::AppState;
use super::error::ApiError;
use crate::convert::{Conversion, ensure_converted, is_valid_id};
use crate::lyrics::fetch_lyrics;
use crate::upstream::StreamInfo;
use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const LIVENESS: &str = "mirrorbeat backend is running";

pub async fn root() -> &'static str {
    LIVENESS
}

pub async fn trending(State(state): State<AppState>) -> Json<Vec<Value>> {
    Json(state.resolver.trending().await)
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Value>> {
    Json(state.resolver.search(&params.q).await)
}

pub async fn stream(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StreamInfo>, ApiError> {
    match state.resolver.stream(&id).await {
        Ok(info) => Ok(Json(info)),
        Err(err) => {
            tracing::warn!(video_id = %id, error = %err, "no stream");
            Err(ApiError::StreamUnavailable)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LyricsParams {
    #[serde(default)]
    artist: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Serialize)]
pub struct LyricsBody {
    lyrics: String,
}

pub async fn lyrics(
    State(state): State<AppState>,
    Query(params): Query<LyricsParams>,
) -> Json<LyricsBody> {
    let lyrics = fetch_lyrics(&state.lyrics, &params.artist, &params.title).await;
    Json(LyricsBody { lyrics })
}

#[derive(Debug, Serialize)]
pub struct ConvertBody {
    done: bool,
}

/// Always answers `done: true` once the converter has returned, whether or
/// not it produced a file. Clients poll `/downloads` to see what exists.
pub async fn convert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConvertBody>, ApiError> {
    if !is_valid_id(&id) {
        return Err(ApiError::InvalidId);
    }
    let outcome = ensure_converted(&state.downloads, state.converter.as_ref(), &id).await;
    if outcome == Conversion::Failed {
        tracing::debug!(video_id = %id, "reporting done despite failed conversion");
    }
    Ok(Json(ConvertBody { done: true }))
}

pub async fn downloads(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.downloads.list().await)
}
