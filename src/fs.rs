use std::io;
use std::path::Path;

use async_trait::async_trait;

/// Filesystem access needed by the reporter.
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Whether `path` exists. Used by the advisory spec naming check only.
    fn exists(&self, path: &Path) -> bool;

    /// Create `dir` and any missing parents.
    async fn create_dir_all(&self, dir: &Path) -> io::Result<()>;

    /// Replace the contents of `path`.
    async fn write(&self, path: &Path, contents: String) -> io::Result<()>;
}

/// The real filesystem, through tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

#[async_trait]
impl Filesystem for TokioFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    async fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(dir).await
    }

    async fn write(&self, path: &Path, contents: String) -> io::Result<()> {
        tokio::fs::write(path, contents).await
    }
}
