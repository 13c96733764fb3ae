mod config;
mod convert;
mod lyrics;
mod server;
#[cfg(test)]
mod testutil;
mod upstream;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mirrorbeat", version, about = "Music metadata proxy over Piped/Invidious mirrors")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Listen port (overrides config and PORT).
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print trending videos as JSON (headless).
    Trending,
    /// Search videos and print JSON (headless).
    Search { query: String },
    /// Resolve the best audio stream for a video (headless).
    Stream { video_id: String },
    /// Look up lyrics (headless).
    Lyrics { artist: String, title: String },
    /// Print the configured mirrors in try-order.
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let mut cfg = config::load(cli.config.as_deref()).context("load config")?;
    cfg.apply_env();

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                cfg.server.port = port;
            }
            server::serve(&cfg).await?;
        }
        Command::Trending => {
            let resolver = upstream::Resolver::from_config(&cfg.upstream)?;
            print_json(&resolver.trending().await)?;
        }
        Command::Search { query } => {
            let resolver = upstream::Resolver::from_config(&cfg.upstream)?;
            print_json(&resolver.search(&query).await)?;
        }
        Command::Stream { video_id } => {
            let resolver = upstream::Resolver::from_config(&cfg.upstream)?;
            let info = resolver
                .stream(&video_id)
                .await
                .with_context(|| format!("resolve stream {video_id}"))?;
            print_json(&info)?;
        }
        Command::Lyrics { artist, title } => {
            let client = lyrics::LyricsOvhClient::new(
                &cfg.lyrics.base_url,
                std::time::Duration::from_secs(cfg.upstream.timeout_secs.max(1)),
            )?;
            println!("{}", lyrics::fetch_lyrics(&client, &artist, &title).await);
        }
        Command::Sources => {
            let pool = upstream::CandidatePool::from_config(&cfg.upstream)?;
            println!("strategy: {:?}", pool.strategy());
            for (i, c) in pool.iter().enumerate() {
                println!("{:02}. [{}] {}", i + 1, c.family, c.base_url);
            }
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(v: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(v)?);
    Ok(())
}
