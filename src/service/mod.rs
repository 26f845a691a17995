// file: src/service/mod.rs
// version: 1.0.0
// guid: 0d6b3e91-8f24-4c57-a0d3-5e18c7b92f64

//! Domain services: distribution-agnostic policy on top of the ports
//!
//! Services validate requests, sequence port calls and decide how
//! failures degrade. They never touch the platform seams directly.

pub mod backup;
pub mod dns;
pub mod environment;
pub mod firewall;
pub mod package;
pub mod ssh;
pub mod user;

pub use backup::BackupService;
pub use dns::DnsService;
pub use environment::EnvironmentService;
pub use firewall::FirewallService;
pub use package::PackageService;
pub use ssh::SshService;
pub use user::UserService;
