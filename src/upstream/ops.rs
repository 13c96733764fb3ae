//! Per-operation request paths, response checks and normalization.

use crate::upstream::models::StreamInfo;
use crate::upstream::pool::Family;
use serde_json::Value;

/// One logical upstream call, resolved against every candidate in turn.
pub trait Operation {
    type Output;

    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Path (and query) appended to a candidate's base URL.
    fn path(&self, family: Family) -> String;

    /// Normalized output if `body` is usable, `None` to move on to the next
    /// candidate.
    fn accept(&self, family: Family, body: &Value) -> Option<Self::Output>;
}

#[derive(Debug, Clone)]
pub struct Trending {
    pub region: String,
}

impl Operation for Trending {
    type Output = Vec<Value>;

    fn name(&self) -> &'static str {
        "trending"
    }

    fn path(&self, _family: Family) -> String {
        format!("/trending?region={}", urlencoding::encode(&self.region))
    }

    fn accept(&self, _family: Family, body: &Value) -> Option<Vec<Value>> {
        let list = body.as_array().filter(|a| !a.is_empty())?;
        Some(video_records(list))
    }
}

#[derive(Debug, Clone)]
pub struct Search {
    pub query: String,
}

impl Operation for Search {
    type Output = Vec<Value>;

    fn name(&self) -> &'static str {
        "search"
    }

    fn path(&self, _family: Family) -> String {
        format!("/search?q={}", urlencoding::encode(&self.query))
    }

    fn accept(&self, _family: Family, body: &Value) -> Option<Vec<Value>> {
        // Piped wraps results in `items`; Invidious returns a bare array.
        if let Some(items) = body.get("items").and_then(Value::as_array)
            && !items.is_empty()
        {
            return Some(
                items
                    .iter()
                    .filter(|v| has_video_type(v))
                    .cloned()
                    .collect(),
            );
        }
        let list = body.as_array().filter(|a| !a.is_empty())?;
        Some(video_records(list))
    }
}

#[derive(Debug, Clone)]
pub struct Stream {
    pub video_id: String,
}

impl Operation for Stream {
    type Output = StreamInfo;

    fn name(&self) -> &'static str {
        "stream"
    }

    fn path(&self, family: Family) -> String {
        let id = urlencoding::encode(&self.video_id);
        match family {
            Family::Piped => format!("/streams/{id}"),
            Family::Invidious => format!("/videos/{id}"),
        }
    }

    fn accept(&self, family: Family, body: &Value) -> Option<StreamInfo> {
        let candidates = audio_candidates(family, body);
        let best = best_by_bitrate(&candidates)?;
        let url = non_empty_str(best.get("url"))?;

        let title = non_empty_str(body.get("title")).unwrap_or("Unknown");
        let artist = non_empty_str(body.get("uploader"))
            .or_else(|| non_empty_str(body.get("author")))
            .unwrap_or("Unknown");

        Some(StreamInfo {
            url: url.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
        })
    }
}

fn video_records(list: &[Value]) -> Vec<Value> {
    list.iter()
        .filter(|v| has_video_type(v) || v.get("videoId").is_some_and(truthy))
        .cloned()
        .collect()
}

fn has_video_type(v: &Value) -> bool {
    v.get("type").and_then(Value::as_str) == Some("video")
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn non_empty_str(v: Option<&Value>) -> Option<&str> {
    v.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Audio entries of a stream listing. Invidious bodies without `audioStreams`
/// carry their audio tracks inside `adaptiveFormats`.
fn audio_candidates(family: Family, body: &Value) -> Vec<&Value> {
    if let Some(streams) = body.get("audioStreams").and_then(Value::as_array)
        && !streams.is_empty()
    {
        return streams.iter().collect();
    }
    if family == Family::Invidious
        && let Some(formats) = body.get("adaptiveFormats").and_then(Value::as_array)
    {
        return formats
            .iter()
            .filter(|f| {
                f.get("type")
                    .and_then(Value::as_str)
                    .is_some_and(|t| t.starts_with("audio/"))
            })
            .collect();
    }
    Vec::new()
}

/// Numeric or string bitrate. Anything unparseable or non-finite counts as 0.
fn bitrate(v: &Value) -> f64 {
    let rate = match v.get("bitrate") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    rate.filter(|f| f.is_finite()).unwrap_or(0.0)
}

/// Highest bitrate entry; the first one wins on ties.
fn best_by_bitrate<'a>(candidates: &[&'a Value]) -> Option<&'a Value> {
    let mut best: Option<(&'a Value, f64)> = None;
    for &c in candidates {
        let rate = bitrate(c);
        match best {
            Some((_, top)) if rate <= top => {}
            _ => best = Some((c, rate)),
        }
    }
    best.map(|(v, _)| v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paths_per_family() {
        let s = Stream {
            video_id: "abc123".into(),
        };
        assert_eq!(s.path(Family::Piped), "/streams/abc123");
        assert_eq!(s.path(Family::Invidious), "/videos/abc123");

        let q = Search {
            query: "daft punk & co".into(),
        };
        assert_eq!(q.path(Family::Piped), "/search?q=daft%20punk%20%26%20co");

        let t = Trending {
            region: "IN".into(),
        };
        assert_eq!(t.path(Family::Invidious), "/trending?region=IN");
    }

    #[test]
    fn test_trending_requires_non_empty_array() {
        let t = Trending {
            region: "IN".into(),
        };
        assert!(t.accept(Family::Piped, &json!([])).is_none());
        assert!(t.accept(Family::Piped, &json!({"items": [1]})).is_none());

        let body = json!([
            {"type": "video", "title": "a"},
            {"type": "channel", "title": "b"},
            {"videoId": "xyz", "title": "c"},
            {"videoId": "", "title": "d"},
        ]);
        let out = t.accept(Family::Invidious, &body).unwrap();
        let titles: Vec<_> = out.iter().map(|v| v["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["a", "c"]);
    }

    #[test]
    fn test_search_items_only_keep_video_type() {
        let q = Search { query: "x".into() };
        let body = json!({"items": [
            {"type": "video", "title": "a"},
            {"videoId": "v", "type": "playlist", "title": "b"},
        ]});
        let out = q.accept(Family::Piped, &body).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["title"], "a");
    }

    #[test]
    fn test_search_falls_back_to_bare_array() {
        let q = Search { query: "x".into() };
        let body = json!([{"videoId": "v1", "type": "playlist"}]);
        assert_eq!(q.accept(Family::Invidious, &body).unwrap().len(), 1);
        assert!(q.accept(Family::Piped, &json!({"items": []})).is_none());
        assert!(q.accept(Family::Piped, &json!({"error": "down"})).is_none());
    }

    #[test]
    fn test_stream_picks_first_max_bitrate() {
        let s = Stream {
            video_id: "id".into(),
        };
        let body = json!({
            "title": "Song",
            "uploader": "Band",
            "audioStreams": [
                {"bitrate": 128, "url": "A"},
                {"bitrate": 320, "url": "B"},
                {"bitrate": 320, "url": "C"},
            ],
        });
        let info = s.accept(Family::Piped, &body).unwrap();
        assert_eq!(
            info,
            StreamInfo {
                url: "B".into(),
                title: "Song".into(),
                artist: "Band".into(),
            }
        );
    }

    #[test]
    fn test_stream_non_finite_bitrate_counts_as_zero() {
        let s = Stream {
            video_id: "id".into(),
        };
        let body = json!({"audioStreams": [
            {"bitrate": 320, "url": "B"},
            {"bitrate": "NaN", "url": "A"},
            {"bitrate": "inf", "url": "I"},
            {"bitrate": 128, "url": "C"},
        ]});
        assert_eq!(s.accept(Family::Piped, &body).unwrap().url, "B");

        let only_bad = json!({"audioStreams": [
            {"bitrate": "NaN", "url": "A"},
            {"bitrate": "-inf", "url": "D"},
        ]});
        assert_eq!(s.accept(Family::Piped, &only_bad).unwrap().url, "A");
    }

    #[test]
    fn test_stream_best_without_url_is_rejected() {
        let s = Stream {
            video_id: "id".into(),
        };
        let body = json!({"audioStreams": [
            {"bitrate": 128, "url": "A"},
            {"bitrate": 320},
        ]});
        assert!(s.accept(Family::Piped, &body).is_none());
        assert!(s.accept(Family::Piped, &json!({"audioStreams": []})).is_none());
    }

    #[test]
    fn test_stream_invidious_adaptive_formats() {
        let s = Stream {
            video_id: "id".into(),
        };
        let body = json!({
            "title": "Song",
            "author": "Channel",
            "adaptiveFormats": [
                {"type": "video/mp4", "bitrate": "900000", "url": "V"},
                {"type": "audio/webm; codecs=\"opus\"", "bitrate": "160000", "url": "O"},
                {"type": "audio/mp4", "bitrate": "130000", "url": "M"},
            ],
        });
        let info = s.accept(Family::Invidious, &body).unwrap();
        assert_eq!(info.url, "O");
        assert_eq!(info.artist, "Channel");
        assert!(s.accept(Family::Piped, &body).is_none());
    }

    #[test]
    fn test_stream_defaults_unknown_metadata() {
        let s = Stream {
            video_id: "id".into(),
        };
        let body = json!({"audioStreams": [{"bitrate": "64", "url": "A"}]});
        let info = s.accept(Family::Piped, &body).unwrap();
        assert_eq!(info.title, "Unknown");
        assert_eq!(info.artist, "Unknown");
    }
}
