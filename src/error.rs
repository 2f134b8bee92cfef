//! Error types for healthgauge
//!
//! Each failure class has its own enum so callers can tell a dropped
//! observation from a misconfigured pipeline. [`Error`] wraps all of them for
//! code that only needs to propagate.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in healthgauge
#[derive(Error, Debug)]
pub enum Error {
    /// Tag set could not be encoded or decoded
    #[error("Attribute codec error: {0}")]
    Codec(#[from] CodecError),

    /// Instrument could not be registered
    #[error("Instrument registration failed: {0}")]
    Registration(#[from] RegistrationError),

    /// A collected point could not be emitted
    #[error("Emit failed: {0}")]
    Emit(#[from] EmitError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML configuration parse error
    #[error("Failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Prometheus registry error
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Codec Errors
// =============================================================================

/// Failures of the canonical tag-set encoding.
///
/// Never fatal: the affected observation is dropped, or the affected entry is
/// discarded during a drain.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Attribute key is empty
    #[error("attribute key must not be empty")]
    EmptyKey,

    /// Value cannot be represented in the canonical encoding
    #[error("unsupported value for attribute '{key}': {reason}")]
    UnsupportedValue { key: String, reason: String },

    /// Tag set could not be written as canonical JSON
    #[error("failed to encode canonical key: {0}")]
    Encode(#[source] serde_json::Error),

    /// Encoded key is not valid canonical JSON
    #[error("malformed canonical key: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Encoded key names the same attribute twice
    #[error("duplicate attribute key in canonical key: {key}")]
    DuplicateKey { key: String },
}

// =============================================================================
// Registration Errors
// =============================================================================

/// Failures when binding an instrument to a [`crate::registry::MeterRegistry`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// Name does not satisfy the instrument naming rules
    #[error("invalid instrument name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Name is already taken in this registry
    #[error("instrument '{name}' is already registered")]
    Duplicate { name: String },
}

// =============================================================================
// Emit Errors
// =============================================================================

/// Failures raised by a point sink during collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmitError {
    /// Tag key is not a valid label name for the target format
    #[error("invalid label name '{label}' on instrument '{instrument}'")]
    InvalidLabelName { instrument: String, label: String },

    /// Sink no longer accepts points
    #[error("sink closed: {0}")]
    Closed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<i64>("x").unwrap_err()
    }

    #[test]
    fn test_encode_and_decode_failures_are_distinct() {
        let encode = CodecError::Encode(json_error()).to_string();
        let decode = CodecError::Malformed(json_error()).to_string();

        assert!(encode.starts_with("failed to encode canonical key"));
        assert!(decode.starts_with("malformed canonical key"));
    }
}
