use super::Converter;
use anyhow::Context;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Extracts audio with yt-dlp (`-x --audio-format mp3`).
#[derive(Debug, Clone)]
pub struct YtDlpConverter {
    program: String,
}

impl YtDlpConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for YtDlpConverter {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[async_trait]
impl Converter for YtDlpConverter {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn convert(&self, video_id: &str, out: &Path) -> anyhow::Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-x", "--audio-format", "mp3", "--no-playlist", "-o"])
            .arg(out)
            .arg(format!("https://youtube.com/watch?v={video_id}"))
            .stdin(std::process::Stdio::null());

        let output = cmd
            .output()
            .await
            .with_context(|| format!("run {}", self.program))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{} failed: {}", self.program, stderr.trim());
        }
        Ok(())
    }
}
