// file: src/logging/mod.rs
// version: 1.0.0
// guid: 9b4f7c2e-5a61-4d8f-b3e9-7c0a4d51e826

//! Tracing setup for the command line frontend

pub mod logger;

pub use logger::init_logger;
