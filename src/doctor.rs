//! Doctor command: health checks for the trust store layout.

use anyhow::Result;

use crate::config::TrustPaths;
use crate::platform::CacheRefresher;
use crate::store;

/// Result of a single check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub ok: bool,
    pub message: String,
}

impl CheckResult {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Run all doctor checks.
pub fn run_checks(paths: &TrustPaths, refresher: &dyn CacheRefresher) -> Result<Vec<CheckResult>> {
    let mut results = Vec::new();

    // 1. Both directories exist (remove-defaults fails without them)
    for dir in [&paths.anchor_dir, &paths.system_certs_dir] {
        if dir.is_dir() {
            results.push(CheckResult::pass(format!("{} exists", dir.display())));
        } else {
            results.push(CheckResult::fail(format!("{} is missing", dir.display())));
        }
    }

    // 2. Rebuild command is on PATH
    let command = refresher.command();
    match which::which(command) {
        Ok(bin) => results.push(CheckResult::pass(format!("'{command}' found at {}", bin.display()))),
        Err(_) => results.push(CheckResult::fail(format!("'{command}' not found on PATH"))),
    }

    // 3. Enumeration file readable
    let entries = match store::read_enumeration(paths) {
        Ok(entries) => {
            results.push(CheckResult::pass(format!(
                "{} lists {} certificate(s)",
                paths.enumeration_file.display(),
                entries.len()
            )));
            entries
        }
        Err(e) => {
            results.push(CheckResult::fail(format!(
                "cannot read {}: {e}",
                paths.enumeration_file.display()
            )));
            return Ok(results);
        }
    };

    // 4. Bundle and its enumeration line agree
    let listed = entries.iter().any(|e| e.selected && e.name == paths.bundle_name);
    match (paths.bundle_path().is_file(), listed) {
        (true, true) => results.push(CheckResult::pass(format!("{} installed", paths.bundle_name))),
        (false, false) => results.push(CheckResult::pass("no CA bundle installed".to_string())),
        (true, false) => results.push(CheckResult::fail(format!(
            "{} present but not listed in {}",
            paths.bundle_name,
            paths.enumeration_file.display()
        ))),
        (false, true) => results.push(CheckResult::fail(format!(
            "{} listed but missing from {}",
            paths.bundle_name,
            paths.anchor_dir.display()
        ))),
    }

    // 5. Repeated applies append the same line again
    for (name, count) in store::duplicate_entries(paths)? {
        results.push(CheckResult::fail(format!(
            "'{name}' listed {count} times in {}",
            paths.enumeration_file.display()
        )));
    }

    Ok(results)
}
