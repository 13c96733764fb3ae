use crate::config::{TrendingFallback, UpstreamConfig};
use crate::upstream::models::{StreamInfo, trending_placeholder};
use crate::upstream::ops::{Operation, Search, Stream, Trending};
use crate::upstream::pool::CandidatePool;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::sync::Arc;
use std::time::Duration;

/// Why a single candidate did not produce a usable response.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("http status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed body: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("response rejected")]
    Rejected,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("{operation}: all {tried} upstream candidates failed")]
    Exhausted { operation: &'static str, tried: usize },
}

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub timeout: Duration,
    pub user_agent: String,
    pub region: String,
    pub trending_fallback: TrendingFallback,
}

impl ResolverSettings {
    pub fn from_config(cfg: &UpstreamConfig) -> Self {
        Self {
            timeout: Duration::from_secs(cfg.timeout_secs.max(1)),
            user_agent: cfg.user_agent.clone(),
            region: cfg.region.clone(),
            trending_fallback: cfg.trending_fallback,
        }
    }
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    pool: CandidatePool,
    settings: ResolverSettings,
}

/// Tries the mirrors of a [`CandidatePool`] one after another until one of
/// them returns a response the operation accepts.
#[derive(Debug, Clone)]
pub struct Resolver {
    inner: Arc<Inner>,
}

impl Resolver {
    pub fn new(pool: CandidatePool, settings: ResolverSettings) -> anyhow::Result<Self> {
        let client_timeout = settings.timeout;
        Self::build(pool, settings, Some(client_timeout))
    }

    /// `client_timeout` bounds reqwest's own phases. The per-attempt deadline
    /// from `settings` is enforced separately in [`Resolver::attempt`].
    fn build(
        pool: CandidatePool,
        settings: ResolverSettings,
        client_timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.user_agent).context("invalid user agent")?,
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(t) = client_timeout {
            builder = builder.timeout(t);
        }
        let http = builder.build().context("build reqwest client")?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                pool,
                settings,
            }),
        })
    }

    pub fn from_config(cfg: &UpstreamConfig) -> anyhow::Result<Self> {
        let pool = CandidatePool::from_config(cfg)?;
        Self::new(pool, ResolverSettings::from_config(cfg))
    }

    pub fn pool(&self) -> &CandidatePool {
        &self.inner.pool
    }

    /// Trending videos. Falls back to a placeholder record (or an empty list,
    /// depending on config) when every mirror fails.
    pub async fn trending(&self) -> Vec<serde_json::Value> {
        let op = Trending {
            region: self.inner.settings.region.clone(),
        };
        match self.resolve(&op).await {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(error = %err, "serving trending fallback");
                match self.inner.settings.trending_fallback {
                    TrendingFallback::Placeholder => vec![trending_placeholder()],
                    TrendingFallback::Empty => Vec::new(),
                }
            }
        }
    }

    /// Video search. An empty query returns nothing without touching any mirror.
    pub async fn search(&self, query: &str) -> Vec<serde_json::Value> {
        if query.is_empty() {
            return Vec::new();
        }
        let op = Search {
            query: query.to_string(),
        };
        match self.resolve(&op).await {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(error = %err, query, "serving empty search result");
                Vec::new()
            }
        }
    }

    pub async fn stream(&self, video_id: &str) -> Result<StreamInfo, ResolveError> {
        let op = Stream {
            video_id: video_id.to_string(),
        };
        self.resolve(&op).await
    }

    /// Run `op` against each candidate in try-order. Attempts are sequential
    /// and each one is bounded by the configured timeout.
    pub async fn resolve<O: Operation>(&self, op: &O) -> Result<O::Output, ResolveError> {
        let pool = &self.inner.pool;
        let order = pool.try_order();

        for &index in &order {
            let candidate = pool.get(index);
            let url = candidate.url_for(&op.path(candidate.family));

            let outcome = match self.attempt(&url).await {
                Ok(body) => op.accept(candidate.family, &body).ok_or(AttemptError::Rejected),
                Err(err) => Err(err),
            };

            match outcome {
                Ok(output) => {
                    pool.mark_success(index);
                    tracing::debug!(operation = op.name(), %url, "upstream accepted");
                    return Ok(output);
                }
                Err(err) => {
                    tracing::debug!(
                        operation = op.name(),
                        family = %candidate.family,
                        %url,
                        error = %err,
                        "upstream attempt failed"
                    );
                }
            }
        }

        Err(ResolveError::Exhausted {
            operation: op.name(),
            tried: order.len(),
        })
    }

    async fn attempt(&self, url: &str) -> Result<serde_json::Value, AttemptError> {
        let timeout = self.inner.settings.timeout;
        let request = async {
            let response = self
                .inner
                .http
                .get(url)
                .send()
                .await
                .map_err(|e| classify(e, timeout))?;
            let status = response.status();
            if !status.is_success() {
                return Err(AttemptError::Status(status));
            }
            let bytes = response.bytes().await.map_err(|e| classify(e, timeout))?;
            serde_json::from_slice::<serde_json::Value>(&bytes).map_err(AttemptError::Malformed)
        };

        // The client timeout covers reqwest's own phases; this one guarantees
        // the attempt is dropped even if the future never resolves.
        tokio::time::timeout(timeout, request)
            .await
            .unwrap_or(Err(AttemptError::Timeout(timeout)))
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> AttemptError {
    if err.is_timeout() {
        AttemptError::Timeout(timeout)
    } else {
        AttemptError::Network(err)
    }
}
