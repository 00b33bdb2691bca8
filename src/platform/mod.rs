//! Platform abstraction for trust store filesystem access and cache rebuilds.

#[cfg(unix)]
pub mod unix;

use anyhow::Result;
use std::path::Path;

/// Ownership and permission bits applied by [`Filesystem::write_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOwner {
    /// User name; `None` keeps the process's user.
    pub user: Option<String>,
    /// Group name; `None` keeps the process's group.
    pub group: Option<String>,
    pub mode: u32,
}

impl FileOwner {
    pub fn root(mode: u32) -> Self {
        Self {
            user: Some("root".to_string()),
            group: Some("root".to_string()),
            mode,
        }
    }

    pub fn inherit(mode: u32) -> Self {
        Self {
            user: None,
            group: None,
            mode,
        }
    }
}

/// Trait for the filesystem primitives the trust store mutators need.
pub trait Filesystem: Send + Sync {
    /// Atomically create or replace `path` with `contents`, then apply `owner`.
    fn write_file(&self, path: &Path, contents: &str, owner: &FileOwner) -> Result<()>;
    /// Append `line` and a newline to `path`, creating it if absent.
    fn append_line(&self, path: &Path, line: &str) -> Result<()>;
    /// Remove every entry under `dir`, keeping `dir` itself. Fails if `dir` is missing.
    fn delete_dir_contents(&self, dir: &Path) -> Result<()>;
}

/// Trait for rebuilding the system trust cache.
pub trait CacheRefresher: Send + Sync {
    fn refresh(&self) -> Result<()>;
    /// Program run by [`CacheRefresher::refresh`], for diagnostics.
    fn command(&self) -> &str;
}

/// Get platform Filesystem implementation.
pub fn default_filesystem() -> Box<dyn Filesystem> {
    #[cfg(unix)]
    return Box::new(unix::LocalFilesystem);

    #[cfg(not(unix))]
    return Box::new(Unsupported);
}

/// Get platform CacheRefresher implementation.
/// If ANCHOR_REFRESH_COMMAND is set (e.g. in tests), runs that program instead.
pub fn default_refresher() -> Box<dyn CacheRefresher> {
    #[cfg(unix)]
    {
        if let Ok(program) = std::env::var("ANCHOR_REFRESH_COMMAND") {
            return Box::new(unix::UpdateCaCertificates::new(program));
        }
        Box::new(unix::UpdateCaCertificates::default())
    }

    #[cfg(not(unix))]
    return Box::new(Unsupported);
}

#[cfg(not(unix))]
struct Unsupported;

#[cfg(not(unix))]
impl Filesystem for Unsupported {
    fn write_file(&self, _path: &Path, _contents: &str, _owner: &FileOwner) -> Result<()> {
        Err(crate::error::TrustStoreError::Unsupported.into())
    }

    fn append_line(&self, _path: &Path, _line: &str) -> Result<()> {
        Err(crate::error::TrustStoreError::Unsupported.into())
    }

    fn delete_dir_contents(&self, _dir: &Path) -> Result<()> {
        Err(crate::error::TrustStoreError::Unsupported.into())
    }
}

#[cfg(not(unix))]
impl CacheRefresher for Unsupported {
    fn refresh(&self) -> Result<()> {
        Err(crate::error::TrustStoreError::Unsupported.into())
    }

    fn command(&self) -> &str {
        ""
    }
}
