//! Reconcile the system trust store with the `ca-certs` config section.

use anyhow::Result;

use crate::config::{CloudConfig, TrustPaths};
use crate::platform::{default_filesystem, default_refresher, CacheRefresher, Filesystem};
use crate::trust;

/// Module name used when none is given.
pub const MODULE_NAME: &str = "ca-certs";

/// What a [`Reconciler::handle`] run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// The config had a `ca-certs` section.
    pub configured: bool,
    pub removed_defaults: bool,
    /// Number of certificates written to the bundle.
    pub installed: usize,
    pub refreshed: bool,
}

/// Applies a declarative config to one trust store.
pub struct Reconciler {
    paths: TrustPaths,
    fs: Box<dyn Filesystem>,
    refresher: Box<dyn CacheRefresher>,
}

impl Reconciler {
    pub fn new(paths: TrustPaths, fs: Box<dyn Filesystem>, refresher: Box<dyn CacheRefresher>) -> Self {
        Self {
            paths,
            fs,
            refresher,
        }
    }

    /// Reconciler for the local host (respects ANCHOR_ROOT and ANCHOR_REFRESH_COMMAND).
    pub fn system() -> Self {
        Self::new(TrustPaths::default_paths(), default_filesystem(), default_refresher())
    }

    /// Run the stages in order: remove defaults, add trusted certs, rebuild the cache.
    ///
    /// Without a `ca-certs` section nothing is touched. Otherwise the cache is rebuilt even
    /// when neither mutation ran. The first failing stage aborts the run; earlier stages are
    /// not rolled back.
    pub fn handle(&self, name: &str, cfg: &CloudConfig) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let Some(section) = cfg.ca_certs.as_ref() else {
            log::debug!("[{name}] no ca-certs section, skipping");
            return Ok(report);
        };
        report.configured = true;

        if section.remove_defaults {
            log::info!("[{name}] removing default CA certificates");
            trust::remove_default_ca_certs(self.fs.as_ref(), &self.paths)?;
            report.removed_defaults = true;
        }

        let certs = section.trusted_certs();
        if !certs.is_empty() {
            trust::add_ca_certs(self.fs.as_ref(), &self.paths, &certs)?;
            report.installed = certs.len();
        }

        trust::update_ca_certs(self.refresher.as_ref())?;
        report.refreshed = true;
        Ok(report)
    }
}

/// Reconcile the local host's trust store with `cfg`.
pub fn handle(name: &str, cfg: &CloudConfig) -> Result<ReconcileReport> {
    Reconciler::system().handle(name, cfg)
}
