use thiserror::Error;

/// Core error type shared across seedkit crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema document violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// Engine or catalog configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A requested feature is not yet supported.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Convenience alias for results returned by seedkit crates.
pub type Result<T> = std::result::Result<T, Error>;
