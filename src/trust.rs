//! Trust store mutators: install the configured bundle, wipe the existing anchors.
//!
//! None of these take effect until the trust cache is rebuilt with [`update_ca_certs`].

use anyhow::{Context, Result};

use crate::config::TrustPaths;
use crate::platform::{CacheRefresher, Filesystem};

/// Install `certs` as this module's bundle and list it in the enumeration file.
///
/// The bundle is the certificates joined by newlines, written verbatim over any previous
/// bundle of the same name. Other files in the anchor directory are left alone. An empty
/// slice does nothing.
///
/// The enumeration line is appended on every call, so repeated installs leave duplicate
/// lines behind.
pub fn add_ca_certs(fs: &dyn Filesystem, paths: &TrustPaths, certs: &[String]) -> Result<()> {
    if certs.is_empty() {
        return Ok(());
    }
    let bundle = certs.join("\n");
    let bundle_path = paths.bundle_path();
    fs.write_file(&bundle_path, &bundle, &paths.owner)
        .with_context(|| format!("write CA bundle {}", bundle_path.display()))?;
    // Only list the bundle once it exists, or the rebuild would reference a missing file.
    fs.append_line(&paths.enumeration_file, &paths.bundle_name)
        .with_context(|| format!("register bundle in {}", paths.enumeration_file.display()))?;
    log::info!("installed {} CA certificate(s) to {}", certs.len(), bundle_path.display());
    Ok(())
}

/// Remove every trusted CA certificate from the system.
///
/// This deletes *all* entries of the anchor directory and the resolved certificate
/// directory, not only the distribution defaults, and empties the enumeration file.
/// Nothing is backed up. Fails if either directory is missing or an entry cannot be removed.
pub fn remove_default_ca_certs(fs: &dyn Filesystem, paths: &TrustPaths) -> Result<()> {
    fs.delete_dir_contents(&paths.anchor_dir)
        .with_context(|| format!("clear {}", paths.anchor_dir.display()))?;
    fs.delete_dir_contents(&paths.system_certs_dir)
        .with_context(|| format!("clear {}", paths.system_certs_dir.display()))?;
    fs.write_file(&paths.enumeration_file, "", &paths.owner)
        .with_context(|| format!("truncate {}", paths.enumeration_file.display()))?;
    log::info!("removed default CA certificates");
    Ok(())
}

/// Rebuild the system trust cache.
pub fn update_ca_certs(refresher: &dyn CacheRefresher) -> Result<()> {
    log::info!("updating CA certificate cache with '{}'", refresher.command());
    refresher.refresh()
}
