use std::path::Path;

use crate::error::{Error, Result};
use crate::fs::Filesystem;

/// Create the parent directories of `path`, then write `xml` to it.
pub async fn write_report(fs: &dyn Filesystem, path: &Path, xml: String) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs.create_dir_all(dir)
            .await
            .map_err(|source| Error::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
    }
    fs.write(path, xml).await.map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the report, logging the outcome instead of returning it.
pub async fn write_report_logged(fs: &dyn Filesystem, path: &Path, xml: String) {
    match write_report(fs, path, xml).await {
        Ok(()) => tracing::debug!("JUnit results written to \"{}\".", path.display()),
        Err(e) => tracing::warn!("Cannot write JUnit xml\n\t{}", e),
    }
}
