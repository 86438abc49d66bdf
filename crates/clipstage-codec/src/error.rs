//! Error types for encoding and demuxing.

use thiserror::Error;

/// Errors that can occur during encode/decode operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The negotiated codec combination has no encoder in this build.
    #[error("Unsupported codec: {0}")]
    Unsupported(String),

    /// Input does not match the encoder configuration.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The container bytes could not be parsed.
    #[error("Malformed container: {0}")]
    Malformed(String),

    /// The encoder finalized to a zero-byte payload.
    ///
    /// A known platform failure mode; retryable, never a silent success.
    #[error("Encoder produced an empty output")]
    EmptyOutput,
}
