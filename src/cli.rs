//! CLI definitions and command routing.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{config_path, CloudConfig, TrustPaths};
use crate::reconcile::{self, MODULE_NAME};
use crate::store;

#[derive(Parser)]
#[command(name = "anchor")]
#[command(about = "Reconcile the system CA trust store with a declarative config")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply the ca-certs section: remove defaults, install trusted CAs, rebuild the cache
    Apply {
        /// Config file (TOML, or JSON with a .json extension); defaults to $ANCHOR_CONFIG
        #[arg(long)]
        config: Option<PathBuf>,
        /// Module name used in log messages
        #[arg(long, default_value = MODULE_NAME)]
        name: String,
    },
    /// List enumeration file entries and whether the CA bundle is installed
    Status,
    /// Print the trust store paths in use
    Paths,
    /// Check the trust store layout and rebuild command
    Doctor,
}

/// Run CLI and dispatch to handlers.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = TrustPaths::default_paths();

    match cli.command {
        Commands::Apply { config, name } => cmd_apply(config, &name),
        Commands::Status => cmd_status(&paths),
        Commands::Paths => cmd_paths(&paths),
        Commands::Doctor => cmd_doctor(&paths),
    }
}

fn cmd_apply(config: Option<PathBuf>, name: &str) -> Result<()> {
    let path = config.unwrap_or_else(config_path);
    let cfg = CloudConfig::load(&path)?;
    let report = reconcile::handle(name, &cfg)?;

    if !report.configured {
        println!("No ca-certs section in {}; nothing to do.", path.display());
        return Ok(());
    }
    if report.removed_defaults {
        println!("Removed default CA certificates.");
    }
    if report.installed > 0 {
        println!("Installed {} trusted CA certificate(s).", report.installed);
    }
    println!("Updated CA certificate cache.");
    Ok(())
}

fn cmd_status(paths: &TrustPaths) -> Result<()> {
    for entry in store::read_enumeration(paths)? {
        let mark = if entry.selected { "" } else { " (deselected)" };
        println!("{}{mark}", entry.name);
    }
    let installed = if store::bundle_installed(paths)? {
        "installed"
    } else {
        "not installed"
    };
    println!("{}: {installed}", paths.bundle_name);
    Ok(())
}

fn cmd_paths(paths: &TrustPaths) -> Result<()> {
    println!("anchors\t{}", paths.anchor_dir.display());
    println!("bundle\t{}", paths.bundle_path().display());
    println!("config\t{}", paths.enumeration_file.display());
    println!("system\t{}", paths.system_certs_dir.display());
    Ok(())
}

fn cmd_doctor(paths: &TrustPaths) -> Result<()> {
    let refresher = crate::platform::default_refresher();
    let results = crate::doctor::run_checks(paths, refresher.as_ref())?;
    let mut failed = 0;
    for r in &results {
        let tag = if r.ok { "ok" } else { "FAIL" };
        println!("[{tag}] {}", r.message);
        if !r.ok {
            failed += 1;
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} check(s) failed");
    }
    Ok(())
}
