use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub mod defaults;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub lyrics: LyricsConfig,
    pub paths: PathsConfig,
    pub convert: ConvertConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    /// Overridden by the `PORT` environment variable when set.
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Piped API mirrors, tried before any Invidious mirror.
    pub piped: Vec<String>,
    /// Invidious API mirrors (base includes `/api/v1`).
    pub invidious: Vec<String>,
    /// Region passed to the trending endpoints.
    pub region: String,
    /// Hard deadline for a single upstream attempt.
    pub timeout_secs: u64,
    pub user_agent: String,
    pub strategy: Strategy,
    pub trending_fallback: TrendingFallback,
}

/// Order in which pool candidates are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Declaration order, every time.
    #[default]
    Sequential,
    /// Start at the last candidate that answered, then wrap around.
    Affinity,
}

/// What `/trending` returns when every mirror fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrendingFallback {
    #[default]
    Placeholder,
    Empty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub downloads_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Downloader executable (yt-dlp compatible).
    pub program: String,
}

impl Default for Config {
    fn default() -> Self {
        defaults::defaults()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: defaults::DEFAULT_PORT,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            piped: defaults::PIPED_MIRRORS.iter().map(|s| s.to_string()).collect(),
            invidious: defaults::INVIDIOUS_MIRRORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            region: "IN".to_string(),
            timeout_secs: 6,
            user_agent: "Mozilla/5.0".to_string(),
            strategy: Strategy::default(),
            trending_fallback: TrendingFallback::default(),
        }
    }
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            base_url: crate::lyrics::LyricsOvhClient::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let proj = ProjectDirs::from("dev", "mirrorbeat", "mirrorbeat");
        let downloads_dir = proj
            .as_ref()
            .map(|p| p.data_dir().join("downloads"))
            .unwrap_or_else(|| PathBuf::from("downloads"));
        Self { downloads_dir }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
        }
    }
}

impl Config {
    /// Apply the `PORT` environment variable on top of the file value.
    pub fn apply_env(&mut self) {
        if let Some(port) = port_from_env(std::env::var("PORT").ok().as_deref()) {
            self.server.port = port;
        }
    }
}

fn port_from_env(raw: Option<&str>) -> Option<u16> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<u16>().ok())
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from("dev", "mirrorbeat", "mirrorbeat")
        .context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
        }
        let cfg = defaults::defaults();
        let raw = toml::to_string_pretty(&cfg).context("serialize default config")?;
        fs::write(&path, raw).with_context(|| format!("write {}", path.display()))?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg = toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
