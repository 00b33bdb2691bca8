//! Unix (Debian-family Linux) platform implementations.

use anyhow::{Context, Result};
use std::ffi::CString;
use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Stdio};

use super::{CacheRefresher, FileOwner, Filesystem};
use crate::error::TrustStoreError;

/// Filesystem on local disk.
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn write_file(&self, path: &Path, contents: &str, owner: &FileOwner) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        log::debug!("writing {} ({} bytes)", path.display(), contents.len());

        // Temp file in the target directory so the final rename stays on one filesystem.
        let mut tmp = tempfile::Builder::new()
            .prefix(".anchor-")
            .tempfile_in(dir)
            .with_context(|| format!("create temp file in {}", dir.display()))?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(owner.mode))
            .with_context(|| format!("chmod {:o} {}", owner.mode, path.display()))?;

        let uid = owner.user.as_deref().map(lookup_uid).transpose()?;
        let gid = owner.group.as_deref().map(lookup_gid).transpose()?;
        if uid.is_some() || gid.is_some() {
            std::os::unix::fs::fchown(tmp.as_file(), uid, gid)
                .with_context(|| format!("chown {}", path.display()))?;
        }

        tmp.persist(path)
            .with_context(|| format!("replace {}", path.display()))?;
        Ok(())
    }

    fn append_line(&self, path: &Path, line: &str) -> Result<()> {
        log::debug!("appending '{}' to {}", line, path.display());
        let mut file = fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open {} for append", path.display()))?;
        // Terminate a last line lacking its newline so the new entry stays separate.
        if file.metadata()?.len() > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                file.write_all(b"\n")?;
            }
        }
        writeln!(file, "{line}").with_context(|| format!("append to {}", path.display()))?;
        Ok(())
    }

    fn delete_dir_contents(&self, dir: &Path) -> Result<()> {
        let entries = fs::read_dir(dir).map_err(|source| TrustStoreError::MissingDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
        for entry in entries {
            let entry = entry.with_context(|| format!("list {}", dir.display()))?;
            let path = entry.path();
            // file_type() does not follow symlinks, so links into other trees are unlinked only.
            let removed = if entry.file_type()?.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            removed.with_context(|| format!("remove {}", path.display()))?;
        }
        log::debug!("cleared {}", dir.display());
        Ok(())
    }
}

fn lookup_uid(user: &str) -> Result<u32> {
    if let Ok(uid) = user.parse() {
        return Ok(uid);
    }
    let name = CString::new(user).context("user name contains NUL")?;
    let pw = unsafe { libc::getpwnam(name.as_ptr()) };
    if pw.is_null() {
        anyhow::bail!("unknown user '{user}'");
    }
    Ok(unsafe { (*pw).pw_uid })
}

fn lookup_gid(group: &str) -> Result<u32> {
    if let Ok(gid) = group.parse() {
        return Ok(gid);
    }
    let name = CString::new(group).context("group name contains NUL")?;
    let gr = unsafe { libc::getgrnam(name.as_ptr()) };
    if gr.is_null() {
        anyhow::bail!("unknown group '{group}'");
    }
    Ok(unsafe { (*gr).gr_gid })
}

/// Runs `update-ca-certificates` (or an override) to rebuild the trust cache.
pub struct UpdateCaCertificates {
    program: String,
    args: Vec<String>,
}

impl UpdateCaCertificates {
    /// Build from a command line such as `"update-ca-certificates --fresh"`.
    pub fn new(command_line: impl AsRef<str>) -> Self {
        let mut parts = command_line.as_ref().split_whitespace().map(String::from);
        let program = parts.next().unwrap_or_default();
        Self {
            program,
            args: parts.collect(),
        }
    }
}

impl Default for UpdateCaCertificates {
    fn default() -> Self {
        Self::new("update-ca-certificates")
    }
}

impl CacheRefresher for UpdateCaCertificates {
    fn refresh(&self) -> Result<()> {
        let bin = which::which(&self.program).map_err(|_| TrustStoreError::CommandNotFound {
            command: self.program.clone(),
        })?;
        log::debug!("Executing {} {:?}", bin.display(), self.args);

        let status = Command::new(&bin)
            .args(&self.args)
            .stdin(Stdio::null())
            .status()
            .with_context(|| format!("run {}", bin.display()))?;
        if !status.success() {
            return Err(TrustStoreError::RefreshFailed {
                command: self.program.clone(),
                status,
            }
            .into());
        }
        Ok(())
    }

    fn command(&self) -> &str {
        &self.program
    }
}
