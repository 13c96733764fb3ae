//! Local audio extraction into a flat downloads directory.

pub mod ytdlp;

pub use ytdlp::YtDlpConverter;

use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Turns a video id into an audio file at `out`.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Name of the converter (for logging)
    fn name(&self) -> &'static str;

    async fn convert(&self, video_id: &str, out: &Path) -> anyhow::Result<()>;
}

/// Flat directory of produced `<id>.mp3` files.
#[derive(Debug, Clone)]
pub struct Downloads {
    dir: PathBuf,
}

impl Downloads {
    /// Open `dir`, creating it if absent.
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn target(&self, video_id: &str) -> PathBuf {
        self.dir.join(format!("{video_id}.mp3"))
    }

    pub async fn contains(&self, video_id: &str) -> bool {
        tokio::fs::try_exists(self.target(video_id))
            .await
            .unwrap_or(false)
    }

    /// File names in the directory, sorted. Empty if the directory can't be read.
    pub async fn list(&self) -> Vec<String> {
        let mut names = Vec::new();
        let Ok(mut entries) = tokio::fs::read_dir(&self.dir).await else {
            return names;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        names
    }
}

/// Ids end up in a file name, so anything that could leave the directory is refused.
pub fn is_valid_id(video_id: &str) -> bool {
    !video_id.is_empty() && !video_id.starts_with('.') && !video_id.contains(['/', '\\', '\0'])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// The file was already on disk; the converter was not run.
    Cached,
    Converted,
    /// The converter reported an error. Callers still answer `done: true`.
    Failed,
}

/// Make sure `<downloads>/<id>.mp3` exists, running `converter` if it doesn't.
pub async fn ensure_converted(
    downloads: &Downloads,
    converter: &dyn Converter,
    video_id: &str,
) -> Conversion {
    if downloads.contains(video_id).await {
        return Conversion::Cached;
    }

    let out = downloads.target(video_id);
    tracing::info!(video_id, converter = converter.name(), "converting");
    match converter.convert(video_id, &out).await {
        Ok(()) => Conversion::Converted,
        Err(err) => {
            tracing::warn!(video_id, error = %err, "conversion failed");
            Conversion::Failed
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::{TempDir, tempdir};

    /// Records calls and writes a dummy file, or fails on request.
    #[derive(Debug, Default)]
    pub struct StubConverter {
        pub calls: AtomicUsize,
        pub ids: Mutex<Vec<String>>,
        pub fail: bool,
    }

    #[async_trait]
    impl Converter for StubConverter {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn convert(&self, video_id: &str, out: &Path) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.ids.lock().unwrap().push(video_id.to_string());
            if self.fail {
                anyhow::bail!("stub failure");
            }
            tokio::fs::write(out, b"mp3").await?;
            Ok(())
        }
    }

    /// Downloads directory inside a fresh temp dir. It does not exist until
    /// `Downloads::open` creates it; keep the guard alive for the test.
    pub fn temp_downloads() -> (TempDir, Downloads) {
        let temp = tempdir().unwrap();
        let downloads = Downloads::open(&temp.path().join("downloads")).unwrap();
        (temp, downloads)
    }

    #[test]
    fn test_valid_ids() {
        assert!(is_valid_id("dQw4w9WgXcQ"));
        assert!(is_valid_id("a-b_c"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id(".."));
        assert!(!is_valid_id("../etc/passwd"));
        assert!(!is_valid_id("a\\b"));
    }

    #[tokio::test]
    async fn test_open_creates_directory_and_lists_sorted() {
        let (_temp, d) = temp_downloads();
        assert!(d.dir().is_dir());
        assert!(d.list().await.is_empty());

        std::fs::write(d.target("b"), b"x").unwrap();
        std::fs::write(d.target("a"), b"x").unwrap();
        assert_eq!(d.list().await, vec!["a.mp3", "b.mp3"]);

        std::fs::remove_dir_all(d.dir()).unwrap();
        assert!(d.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_existing_file_skips_converter() {
        let (_temp, d) = temp_downloads();
        std::fs::write(d.target("abc"), b"x").unwrap();
        let stub = StubConverter::default();

        assert_eq!(ensure_converted(&d, &stub, "abc").await, Conversion::Cached);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_converts_then_caches() {
        let (_temp, d) = temp_downloads();
        let stub = StubConverter::default();

        assert_eq!(ensure_converted(&d, &stub, "xyz").await, Conversion::Converted);
        assert!(d.contains("xyz").await);
        assert_eq!(ensure_converted(&d, &stub, "xyz").await, Conversion::Cached);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*stub.ids.lock().unwrap(), vec!["xyz".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_is_reported_not_raised() {
        let (_temp, d) = temp_downloads();
        let stub = StubConverter {
            fail: true,
            ..Default::default()
        };
        assert_eq!(ensure_converted(&d, &stub, "bad").await, Conversion::Failed);
        assert!(!d.contains("bad").await);
    }
}
