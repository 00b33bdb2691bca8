//! Anchor - reconcile the system CA trust store with a declarative config.

pub mod cli;
pub mod config;
pub mod doctor;
pub mod error;
pub mod platform;
pub mod reconcile;
pub mod store;
pub mod trust;
