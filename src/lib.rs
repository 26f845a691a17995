// file: src/lib.rs
// version: 1.0.0
// guid: 2d7f4b91-8a36-4e05-9c72-f1e8b5a40d63

//! # hardn
//!
//! Baseline hardening for Debian, Ubuntu, Alpine and Proxmox VE hosts:
//! admin accounts, SSH daemon policy, ufw firewall, resolver, package
//! profiles and configuration backups, driven by one YAML document.
//!
//! The crate is layered: `platform` holds the filesystem, command and
//! network seams; `adapters` implement the `ports` against a concrete
//! distribution; `service` validates and sequences; `manager` exposes
//! the operator-facing surface the CLI calls into.

pub mod adapters;
pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod model;
pub mod platform;
pub mod ports;
pub mod service;

pub use error::{HardnError, Result};

/// Version information for the tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
