//! Error types for the license codec.

use thiserror::Error;

/// License codec errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// codec was constructed without a secret key (configuration error).
    #[error("license secret key is not configured")]
    MissingSecret,

    /// Encoder input is outside the representable range.
    #[error("invalid license terms: {0}")]
    InvalidTerms(String),

    /// Key text is structurally malformed (wrong length, bad base-36).
    #[error("invalid license key format: {0}")]
    InvalidKeyFormat(String),

    /// MAC verification failed; the key is forged or corrupted.
    ///
    /// Deliberately carries no detail about which byte differed.
    #[error("license key signature invalid")]
    InvalidSignature,

    /// Authenticated payload failed semantic validation.
    #[error("invalid license payload: {0}")]
    InvalidPayload(String),
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
