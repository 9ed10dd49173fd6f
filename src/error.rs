//! use minicert::error::MiniCertError;

use thiserror::Error;

/// Represents errors that can occur while issuing a MiniCert.
///
/// Every variant is fatal to a run; the message names the step that failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MiniCertError {
    /// Malformed or out-of-range user-supplied field.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Expiry arithmetic overflow, or an expiry that is not in the future.
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// Issuer key file missing, unreadable, or undecodable.
    #[error("Failed to load issuer key: {0}")]
    KeyLoadError(String),

    /// Issuer key with the wrong size or failing the consistency check.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// No consistent subject key was produced within the retry ceiling.
    #[error("Couldn't generate a usable subject key after {attempts} attempts")]
    KeyGenerationExhausted { attempts: usize },

    /// Error from the RSA signing transform.
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Artifact write or delete failure.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Assembled data would exceed the blob capacity.
    #[error("Buffer overflow: {0}")]
    BufferOverflow(String),
}

pub type Result<T> = std::result::Result<T, MiniCertError>;

impl From<pem::PemError> for MiniCertError {
    fn from(err: pem::PemError) -> Self {
        MiniCertError::KeyLoadError(err.to_string())
    }
}

impl From<pkcs8::Error> for MiniCertError {
    fn from(err: pkcs8::Error) -> Self {
        MiniCertError::KeyLoadError(err.to_string())
    }
}

impl From<rsa::pkcs1::Error> for MiniCertError {
    fn from(err: rsa::pkcs1::Error) -> Self {
        MiniCertError::KeyLoadError(err.to_string())
    }
}

impl From<rsa::Error> for MiniCertError {
    /// Key material rejected by the RSA backend is an invalid key.
    fn from(err: rsa::Error) -> Self {
        MiniCertError::InvalidKey(err.to_string())
    }
}
