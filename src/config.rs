//! Configuration loading and trust store path resolution.
//!
//! Supports ANCHOR_ROOT env var override for testing.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::platform::FileOwner;

/// Directory holding locally-added CA certificates.
pub const CA_CERT_PATH: &str = "/usr/share/ca-certificates";
/// Name of the bundle this module installs inside [`CA_CERT_PATH`].
pub const CA_CERT_FILENAME: &str = "cloud-init-ca-certs.crt";
/// Distribution list of certificates to include in the trust cache.
pub const CA_CERT_CONFIG: &str = "/etc/ca-certificates.conf";
/// Directory of resolved system certificates.
pub const CA_CERT_SYSTEM_PATH: &str = "/etc/ssl/certs";

/// Default declarative config location.
pub const DEFAULT_CONFIG_FILE: &str = "/etc/anchor/config.toml";

/// Mode for the bundle and the enumeration file.
pub const CA_CERT_MODE: u32 = 0o644;

/// Paths (and file ownership) of the Debian trust store layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustPaths {
    pub anchor_dir: PathBuf,
    pub bundle_name: String,
    pub enumeration_file: PathBuf,
    pub system_certs_dir: PathBuf,
    pub owner: FileOwner,
}

impl TrustPaths {
    /// The live system layout, files owned by root.
    pub fn debian() -> Self {
        Self {
            anchor_dir: PathBuf::from(CA_CERT_PATH),
            bundle_name: CA_CERT_FILENAME.to_string(),
            enumeration_file: PathBuf::from(CA_CERT_CONFIG),
            system_certs_dir: PathBuf::from(CA_CERT_SYSTEM_PATH),
            owner: FileOwner::root(CA_CERT_MODE),
        }
    }

    /// Debian layout rebased under `root`. Written files keep the process's ownership,
    /// since a sandbox is normally not owned by root.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let debian = Self::debian();
        Self {
            anchor_dir: rebase(root, &debian.anchor_dir),
            bundle_name: debian.bundle_name,
            enumeration_file: rebase(root, &debian.enumeration_file),
            system_certs_dir: rebase(root, &debian.system_certs_dir),
            owner: FileOwner::inherit(CA_CERT_MODE),
        }
    }

    /// Paths for testing: use a temp dir as root.
    pub fn for_test(base: impl AsRef<Path>) -> Self {
        Self::from_root(base)
    }

    /// Get default trust store paths (respects ANCHOR_ROOT).
    pub fn default_paths() -> Self {
        match std::env::var_os("ANCHOR_ROOT") {
            Some(root) => Self::from_root(PathBuf::from(root)),
            None => Self::debian(),
        }
    }

    /// Full path of the bundle this module owns.
    pub fn bundle_path(&self) -> PathBuf {
        self.anchor_dir.join(&self.bundle_name)
    }
}

fn rebase(root: &Path, path: &Path) -> PathBuf {
    root.join(path.strip_prefix("/").unwrap_or(path))
}

/// Path to the declarative config (respects ANCHOR_CONFIG).
pub fn config_path() -> PathBuf {
    std::env::var_os("ANCHOR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Trusted certificates: either a single PEM string or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Trusted {
    One(String),
    Many(Vec<String>),
}

impl Trusted {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Trusted::One(cert) => vec![cert.clone()],
            Trusted::Many(certs) => certs.clone(),
        }
    }
}

/// The `ca-certs` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CaCertsConfig {
    /// Wipe every entry of the anchor and system directories before adding.
    #[serde(default, rename = "remove-defaults", alias = "remove_defaults")]
    pub remove_defaults: bool,
    #[serde(default)]
    pub trusted: Option<Trusted>,
}

impl CaCertsConfig {
    /// Trusted certificates in declared order; absent means empty.
    pub fn trusted_certs(&self) -> Vec<String> {
        self.trusted.as_ref().map(Trusted::to_vec).unwrap_or_default()
    }
}

/// Top-level declarative config. Sections belonging to other modules are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CloudConfig {
    /// Absent means no section; an explicit null is rejected.
    #[serde(
        default,
        rename = "ca-certs",
        alias = "ca_certs",
        deserialize_with = "present_section"
    )]
    pub ca_certs: Option<CaCertsConfig>,
}

fn present_section<'de, D>(deserializer: D) -> Result<Option<CaCertsConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    CaCertsConfig::deserialize(deserializer).map(Some)
}

impl CloudConfig {
    /// Load config from path (with shared lock when file exists). A missing file is an
    /// empty config. `.json` files are parsed as JSON, everything else as TOML.
    pub fn load(path: &Path) -> Result<CloudConfig> {
        if !path.is_file() {
            log::debug!("no config at {}, using empty config", path.display());
            return Ok(CloudConfig::default());
        }
        let mut file = fs::OpenOptions::new()
            .read(true)
            .open(path)
            .with_context(|| format!("open config: {}", path.display()))?;
        fs2::FileExt::lock_shared(&file)?;
        let mut s = String::new();
        file.read_to_string(&mut s)?;

        let is_json = path.extension().is_some_and(|e| e == "json");
        let cfg = if is_json {
            Self::from_json_str(&s)
        } else {
            Self::from_toml_str(&s)
        };
        cfg.with_context(|| format!("parse config: {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<CloudConfig> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<CloudConfig> {
        Ok(serde_json::from_str(s)?)
    }
}
