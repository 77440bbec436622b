use std::path::PathBuf;

/// Reporter error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file could not be parsed
    #[error("config error: {}: {message}", .path.display())]
    Config { message: String, path: PathBuf },

    /// Creating the report directory failed
    #[error("cannot create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the report file failed
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// XML rendering failed
    #[error("render error: {0}")]
    Render(String),
}

/// Result type using the reporter Error
pub type Result<T> = std::result::Result<T, Error>;
