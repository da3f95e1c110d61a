//! Error types for claimdrop core.

use thiserror::Error;

/// Core errors that can occur while handling authorizations and signatures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The signature cannot be parsed or no signer can be recovered from it.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// Secret key material was rejected by the curve implementation.
    #[error("invalid secret key")]
    InvalidSecretKey,

    /// A hex string had the wrong length or alphabet.
    #[error("invalid hex for {what}: {reason}")]
    InvalidHex { what: &'static str, reason: String },

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

impl CoreError {
    pub(crate) fn hex(what: &'static str, err: impl std::fmt::Display) -> Self {
        CoreError::InvalidHex {
            what,
            reason: err.to_string(),
        }
    }
}
