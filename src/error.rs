// file: src/error.rs
// version: 1.0.0
// guid: 3f9c1a27-8d42-4b1e-9c6a-5e0f72d4a813

use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, HardnError>;

/// Error types for the hardn tool
#[derive(Error, Debug)]
pub enum HardnError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("required command not found: {0}")]
    MissingCommand(String),

    #[error("{program} exited with status {code:?}: {output}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        output: String,
    },

    #[error("{0}")]
    Mutation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("probe failed: {0}")]
    Probe(String),
}

impl HardnError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new missing-command (preflight) error
    pub fn missing_command(program: impl Into<String>) -> Self {
        Self::MissingCommand(program.into())
    }

    /// Create a new mutation error with context
    pub fn mutation(msg: impl Into<String>) -> Self {
        Self::Mutation(msg.into())
    }

    /// Create a new not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new probe error
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Whether this error represents an absent entity rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
