// file: src/platform/mod.rs
// version: 1.0.0
// guid: 5c8e2a71-d94b-4f03-a6c8-1b7e5d32f940

//! Platform seams: filesystem, command execution, network interfaces
//!
//! These three capabilities are the only way the rest of the crate
//! touches the operating system. Each has a live implementation and an
//! in-memory double, so every layer above runs in tests without root
//! or a Linux kernel.

pub mod command;
pub mod dryrun;
pub mod fs;
pub mod network;

pub use command::{Commander, MockCommander, RecordedCall, SystemCommander};
pub use dryrun::{DryRunCommander, DryRunFileSystem};
pub use fs::{FileMeta, FileSystem, MemoryFileSystem, RealFileSystem};
pub use network::{MemoryNetworkInfo, NetworkInfo, SystemNetworkInfo};
