// file: src/manager/mod.rs
// version: 1.0.0
// guid: 7e1d9c53-2a86-4f40-b0e7-94c3d5a18f26

//! Application managers: user-level intents over the domain services
//!
//! Managers stay thin. They build request objects from intent-level
//! arguments, delegate to a service, and leave the invariants to the
//! layers below. `SecurityManager` composes several of them for the
//! end-to-end hardening run; `MenuManager` aggregates everything for
//! the command dispatcher.

pub mod backup;
pub mod dns;
pub mod environment;
pub mod firewall;
pub mod menu;
pub mod package;
pub mod security;
pub mod ssh;
pub mod user;

pub use backup::BackupManager;
pub use dns::DnsManager;
pub use environment::EnvironmentManager;
pub use firewall::FirewallManager;
pub use menu::MenuManager;
pub use package::PackageManager;
pub use security::SecurityManager;
pub use ssh::SshManager;
pub use user::UserManager;
