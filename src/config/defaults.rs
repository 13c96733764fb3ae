use super::{
    Config, ConvertConfig, LyricsConfig, PathsConfig, ServerConfig, UpstreamConfig,
};

pub const DEFAULT_PORT: u16 = 3000;

pub const PIPED_MIRRORS: &[&str] = &[
    "https://pipedapi.kavin.rocks",
    "https://pipedapi.in.projectsegfau.lt",
    "https://pipedapi.syncpundit.io",
    "https://pipedapi.leptons.xyz",
    "https://pipedapi.nosebs.ru",
];

pub const INVIDIOUS_MIRRORS: &[&str] = &[
    "https://vid.puffyan.us/api/v1",
    "https://yewtu.be/api/v1",
    "https://inv.nadeko.net/api/v1",
    "https://invidious.fdn.fr/api/v1",
    "https://iv.ggtyler.dev/api/v1",
];

pub fn defaults() -> Config {
    Config {
        server: ServerConfig::default(),
        upstream: UpstreamConfig::default(),
        lyrics: LyricsConfig::default(),
        paths: PathsConfig::default(),
        convert: ConvertConfig::default(),
    }
}
