// file: src/config/mod.rs
// version: 1.0.0
// guid: c4a8e2f6-0d53-47b9-8e14-6b2f9d07a5c1

//! Configuration module
//!
//! Handles discovery, loading and validation of the YAML settings
//! document, and maps it into the domain request types.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::HardnConfig;
