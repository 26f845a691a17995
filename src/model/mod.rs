// file: src/model/mod.rs
// version: 1.0.0
// guid: a7d3f0b2-41c8-4e95-b6a1-9f2d8c5e7304

//! Domain entities shared by services, adapters and managers
//!
//! All types here are plain values: constructed at the edge of the
//! application, passed through managers and services, consumed by ports.

pub mod backup;
pub mod dns;
pub mod environment;
pub mod firewall;
pub mod harden;
pub mod os;
pub mod package;
pub mod ssh;
pub mod status;
pub mod user;

pub use backup::{BackupConfig, BackupFile};
pub use dns::DnsConfig;
pub use environment::{EnvironmentConfig, LocaleSettings};
pub use firewall::{
    FirewallAction, FirewallConfig, FirewallPolicy, FirewallProfile, FirewallProtocol,
    FirewallRule, FirewallStatus,
};
pub use harden::HardeningConfig;
pub use os::{OsInfo, OsType};
pub use package::{PackageInstallRequest, PackageSources, PackageType};
pub use ssh::{validate_public_key, SshConfig};
pub use status::{RiskLevel, SecurityStatus};
pub use user::{Group, User};
