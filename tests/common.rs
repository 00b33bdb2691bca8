//! Shared test helpers.
#![allow(dead_code)]

use anchor::config::TrustPaths;
use anchor::platform::{CacheRefresher, FileOwner, Filesystem};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Create a temp directory for use as ANCHOR_ROOT.
/// Uses current dir (workspace) so sandbox allows full access.
pub fn temp_trust_root() -> TempDir {
    tempfile::Builder::new()
        .prefix("anchor_test_")
        .tempdir_in(std::env::current_dir().unwrap_or_else(|_| std::path::Path::new(".").into()))
        .expect("temp dir")
}

/// Lay out a Debian trust store with two distribution CAs under `paths`.
pub fn seed_debian_layout(paths: &TrustPaths) {
    anchor::store::ensure_dirs(paths).unwrap();
    let mozilla = paths.anchor_dir.join("mozilla");
    fs::create_dir_all(&mozilla).unwrap();
    fs::write(mozilla.join("Root_A.crt"), ca_pem("Root A")).unwrap();
    fs::write(mozilla.join("Root_B.crt"), ca_pem("Root B")).unwrap();
    fs::write(paths.system_certs_dir.join("ca-certificates.crt"), "bundle").unwrap();
    #[cfg(unix)]
    std::os::unix::fs::symlink(
        mozilla.join("Root_A.crt"),
        paths.system_certs_dir.join("Root_A.pem"),
    )
    .unwrap();
    fs::write(
        &paths.enumeration_file,
        "# distribution defaults\nmozilla/Root_A.crt\nmozilla/Root_B.crt\n",
    )
    .unwrap();
}

/// Self-signed CA certificate PEM with the given common name.
pub fn ca_pem(cn: &str) -> String {
    let key_pair = rcgen::KeyPair::generate().unwrap();
    let mut params = rcgen::CertificateParams::default();
    params.distinguished_name = rcgen::DistinguishedName::new();
    params.distinguished_name.push(
        rcgen::DnType::CommonName,
        rcgen::DnValue::Utf8String(cn.to_string()),
    );
    params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
    params.self_signed(&key_pair).unwrap().pem()
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

/// Operation seen by the recording collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Write { path: String, contents: String },
    Append { path: String, line: String },
    DeleteContents { path: String },
    Refresh,
}

/// Shared, ordered log of operations.
#[derive(Clone, Default)]
pub struct OpLog(Arc<Mutex<Vec<Op>>>);

impl OpLog {
    pub fn ops(&self) -> Vec<Op> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, op: Op) {
        self.0.lock().unwrap().push(op);
    }
}

/// Filesystem that records calls without touching disk.
pub struct RecordingFilesystem {
    pub log: OpLog,
}

impl Filesystem for RecordingFilesystem {
    fn write_file(&self, path: &Path, contents: &str, _owner: &FileOwner) -> anyhow::Result<()> {
        self.log.push(Op::Write {
            path: path.to_string_lossy().to_string(),
            contents: contents.to_string(),
        });
        Ok(())
    }

    fn append_line(&self, path: &Path, line: &str) -> anyhow::Result<()> {
        self.log.push(Op::Append {
            path: path.to_string_lossy().to_string(),
            line: line.to_string(),
        });
        Ok(())
    }

    fn delete_dir_contents(&self, dir: &Path) -> anyhow::Result<()> {
        self.log.push(Op::DeleteContents {
            path: dir.to_string_lossy().to_string(),
        });
        Ok(())
    }
}

/// Refresher that records calls and optionally fails.
pub struct RecordingRefresher {
    pub log: OpLog,
    pub fail: bool,
}

impl CacheRefresher for RecordingRefresher {
    fn refresh(&self) -> anyhow::Result<()> {
        self.log.push(Op::Refresh);
        if self.fail {
            anyhow::bail!("update-ca-certificates exited with status 1");
        }
        Ok(())
    }

    fn command(&self) -> &str {
        "update-ca-certificates"
    }
}

/// Reconciler over recording collaborators sharing one log.
pub fn recording_reconciler(paths: TrustPaths, fail_refresh: bool) -> (anchor::reconcile::Reconciler, OpLog) {
    let log = OpLog::default();
    let reconciler = anchor::reconcile::Reconciler::new(
        paths,
        Box::new(RecordingFilesystem { log: log.clone() }),
        Box::new(RecordingRefresher {
            log: log.clone(),
            fail: fail_refresh,
        }),
    );
    (reconciler, log)
}

/// Refresher that succeeds without running anything, for on-disk tests.
pub struct NoopRefresher;

impl CacheRefresher for NoopRefresher {
    fn refresh(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn command(&self) -> &str {
        "true"
    }
}
