//! Errors for wipecert
//!
//! Every stage returns its own error type. All of them collapse onto the
//! closed [`ErrorKind`] set that crosses the boundary to the caller.

use thiserror::Error;

/// The closed set of reasons a certificate token can be rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, miniserde::Serialize)]
pub enum ErrorKind {
    /// Token does not have the three-segment shape
    MalformedStructure,
    /// A segment is not valid base64url
    InvalidEncoding,
    /// Decoded bytes are not a well-formed JSON object
    InvalidStructure,
    /// Header names an algorithm outside the allow-list
    UnsupportedAlgorithm,
    /// A required payload claim is absent
    MissingClaim,
    /// The issued-at claim fails sanity bounds
    ImplausibleTimestamp,
    /// Cryptographic verification failed
    SignatureMismatch,
}

impl ErrorKind {
    /// Stable identifier of the kind
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedStructure => "MalformedStructure",
            ErrorKind::InvalidEncoding => "InvalidEncoding",
            ErrorKind::InvalidStructure => "InvalidStructure",
            ErrorKind::UnsupportedAlgorithm => "UnsupportedAlgorithm",
            ErrorKind::MissingClaim => "MissingClaim",
            ErrorKind::ImplausibleTimestamp => "ImplausibleTimestamp",
            ErrorKind::SignatureMismatch => "SignatureMismatch",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Decoder Errors
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Token too large: {size} bytes (maximum: {max} bytes)")]
    TokenTooLarge { size: usize, max: usize },

    #[error("Invalid token format: {0}")]
    MalformedStructure(&'static str),

    #[error("Base64URL decoding failed: {0}")]
    InvalidEncoding(String),

    #[error("JSON parsing failed: {0}")]
    InvalidStructure(String),
}

impl DecodeError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::TokenTooLarge { .. } | DecodeError::MalformedStructure(_) => {
                ErrorKind::MalformedStructure
            }
            DecodeError::InvalidEncoding(_) => ErrorKind::InvalidEncoding,
            DecodeError::InvalidStructure(_) => ErrorKind::InvalidStructure,
        }
    }
}

// ============================================================================
// Validation Errors
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Algorithm '{0}' is not supported")]
    UnsupportedAlgorithm(String),

    #[error("The 'none' algorithm is rejected for security reasons (RFC 8725)")]
    AlgorithmNoneRejected,

    #[error("Algorithm '{found}' not allowed. Allowed: {allowed:?}")]
    AlgorithmNotAllowed { found: String, allowed: Vec<String> },

    #[error("Required claim '{0}' is missing")]
    MissingClaim(String),

    #[error("Claim '{claim}' is not an integer timestamp")]
    TimestampNotInteger { claim: String },

    #[error("Timestamp out of bounds: {value} (valid range: {min} to {max})")]
    TimestampOutOfBounds { value: i64, min: i64, max: i64 },

    #[error("Certificate issued in future at {issued_at} (now: {now}, skew: {skew}s)")]
    IssuedInFuture { issued_at: i64, now: i64, skew: u64 },

    #[error("Certificate too old: issued at {issued_at}, max age {max_age}s (now: {now})")]
    TooOld {
        issued_at: i64,
        now: i64,
        max_age: u64,
    },

    #[error("Integer overflow in timestamp arithmetic")]
    TimestampOverflow,
}

impl ValidationError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::UnsupportedAlgorithm(_)
            | ValidationError::AlgorithmNoneRejected
            | ValidationError::AlgorithmNotAllowed { .. } => ErrorKind::UnsupportedAlgorithm,
            ValidationError::MissingClaim(_) => ErrorKind::MissingClaim,
            ValidationError::TimestampNotInteger { .. }
            | ValidationError::TimestampOutOfBounds { .. }
            | ValidationError::IssuedInFuture { .. }
            | ValidationError::TooOld { .. }
            | ValidationError::TimestampOverflow => ErrorKind::ImplausibleTimestamp,
        }
    }
}

// ============================================================================
// Signature Errors
// ============================================================================

/// Deliberately carries no detail about which check failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerificationError {
    #[error("Signature verification failed")]
    SignatureMismatch,
}

impl VerificationError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            VerificationError::SignatureMismatch => ErrorKind::SignatureMismatch,
        }
    }
}

// ============================================================================
// Trusted Key Errors
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeyError {
    #[error("PEM decoding failed: {0}")]
    Pem(String),

    #[error("Unexpected PEM label '{0}' (expected 'PUBLIC KEY')")]
    PemLabel(String),

    #[error("SubjectPublicKeyInfo decoding failed: {0}")]
    Spki(String),

    #[error("Unsupported public key algorithm: {0}")]
    UnsupportedKeyType(String),

    #[error("Unsupported elliptic curve: {0}")]
    UnsupportedCurve(String),

    #[error("Malformed public key: {0}")]
    Malformed(&'static str),
}

// ============================================================================
// Crate Error
// ============================================================================

/// wipecert Errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error("Trusted key unavailable: {0}")]
    Key(#[from] KeyError),
}

impl Error {
    /// Map onto the closed error kind set
    ///
    /// A broken trust anchor cannot verify anything, so it reports as a
    /// signature mismatch.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::Decode(e) => e.kind(),
            Error::Validation(e) => e.kind(),
            Error::Verification(e) => e.kind(),
            Error::Key(_) => ErrorKind::SignatureMismatch,
        }
    }
}

/// Result type alias for wipecert operations
pub type Result<T> = std::result::Result<T, Error>;
