// file: src/cli/mod.rs
// version: 1.0.0
// guid: e1b6d4a8-3f92-4c07-b5d6-89a1c3e7f025

//! Command line interface for hardn

pub mod args;
pub mod commands;

pub use args::Cli;
pub use commands::*;
