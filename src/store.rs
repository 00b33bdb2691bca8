//! Read-only inspection of the trust store layout.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;

use crate::config::TrustPaths;

/// One line of the enumeration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Certificate path relative to the anchor directory.
    pub name: String,
    /// `false` for lines prefixed with `!`, which update-ca-certificates skips.
    pub selected: bool,
}

/// Parse the enumeration file. A missing file has no entries; comments and blank
/// lines are skipped.
pub fn read_enumeration(paths: &TrustPaths) -> Result<Vec<Entry>> {
    if !paths.enumeration_file.is_file() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&paths.enumeration_file)
        .with_context(|| format!("read {}", paths.enumeration_file.display()))?;
    let entries = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| match l.strip_prefix('!') {
            Some(name) => Entry {
                name: name.to_string(),
                selected: false,
            },
            None => Entry {
                name: l.to_string(),
                selected: true,
            },
        })
        .collect();
    Ok(entries)
}

/// Bundle file exists and is selected in the enumeration file.
pub fn bundle_installed(paths: &TrustPaths) -> Result<bool> {
    if !paths.bundle_path().is_file() {
        return Ok(false);
    }
    Ok(read_enumeration(paths)?
        .iter()
        .any(|e| e.selected && e.name == paths.bundle_name))
}

/// Names listed more than once, with their count.
pub fn duplicate_entries(paths: &TrustPaths) -> Result<Vec<(String, usize)>> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for e in read_enumeration(paths)? {
        *counts.entry(e.name).or_default() += 1;
    }
    Ok(counts.into_iter().filter(|(_, n)| *n > 1).collect())
}

/// Create the layout directories (for sandboxes; the live system ships them).
pub fn ensure_dirs(paths: &TrustPaths) -> Result<()> {
    fs::create_dir_all(&paths.anchor_dir)?;
    fs::create_dir_all(&paths.system_certs_dir)?;
    if let Some(p) = paths.enumeration_file.parent() {
        fs::create_dir_all(p)?;
    }
    Ok(())
}
