use crate::config::{Strategy, UpstreamConfig};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// API family of a mirror. Paths and response shapes differ per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Piped,
    Invidious,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Piped => f.write_str("piped"),
            Family::Invidious => f.write_str("invidious"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub family: Family,
    pub base_url: String,
}

impl Candidate {
    pub fn new(family: Family, base_url: &str) -> Self {
        Self {
            family,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Mirrors for every operation, built once at startup.
///
/// With [`Strategy::Affinity`] the pool remembers the index of the last
/// candidate that produced an accepted response and starts there next time.
/// The cursor is a relaxed atomic: concurrent requests may overwrite each
/// other's value, and a stale cursor only changes which mirror is tried first.
#[derive(Debug)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
    strategy: Strategy,
    cursor: AtomicUsize,
}

impl CandidatePool {
    pub fn new(candidates: Vec<Candidate>, strategy: Strategy) -> anyhow::Result<Self> {
        if candidates.is_empty() {
            anyhow::bail!("upstream pool is empty: configure at least one piped or invidious mirror");
        }
        Ok(Self {
            candidates,
            strategy,
            cursor: AtomicUsize::new(0),
        })
    }

    /// All Piped mirrors first, then all Invidious mirrors.
    pub fn from_config(cfg: &UpstreamConfig) -> anyhow::Result<Self> {
        let candidates = cfg
            .piped
            .iter()
            .map(|u| Candidate::new(Family::Piped, u))
            .chain(cfg.invidious.iter().map(|u| Candidate::new(Family::Invidious, u)))
            .filter(|c| !c.base_url.is_empty())
            .collect();
        Self::new(candidates, cfg.strategy)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn get(&self, index: usize) -> &Candidate {
        &self.candidates[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Relaxed) % self.candidates.len()
    }

    /// Candidate indices in the order a single resolve call tries them.
    pub fn try_order(&self) -> Vec<usize> {
        let len = self.candidates.len();
        let start = match self.strategy {
            Strategy::Sequential => 0,
            Strategy::Affinity => self.cursor(),
        };
        (0..len).map(|i| (start + i) % len).collect()
    }

    pub fn mark_success(&self, index: usize) {
        if self.strategy == Strategy::Affinity {
            self.cursor.store(index, Ordering::Relaxed);
        }
    }
}
