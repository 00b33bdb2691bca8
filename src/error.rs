//! Typed failure classes carried as the root cause of `anyhow::Error`.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrustStoreError {
    /// A directory that must be cleared does not exist or cannot be listed.
    #[error("trust store directory {path} is not accessible: {source}")]
    MissingDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rebuild command ran but exited unsuccessfully.
    #[error("'{command}' failed with {status}")]
    RefreshFailed { command: String, status: ExitStatus },

    #[error("'{command}' not found on PATH")]
    CommandNotFound { command: String },

    #[error("trust store is not supported on this platform")]
    Unsupported,
}
