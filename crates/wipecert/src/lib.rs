//! Offline verification of signed wipe certificates.
//!
//! A wipe certificate is a compact JWS token carried in a QR code. It is
//! verified against a single public key compiled into the build, without
//! network access.
//!
//! ```no_run
//! let result = wipecert::verify_token("eyJhbGciOiJFUzI1NiJ9.eyJpYXQiOjE3MDAwMDAwMDB9.c2ln");
//! match result.certificate() {
//!     Some(cert) => println!("wiped: {:?}", cert.device_id()),
//!     None => println!("rejected: {:?}", result.error_kind()),
//! }
//! ```

mod error;

// Internal modules
pub(crate) mod algorithm;
pub(crate) mod certificate;
pub(crate) mod claims;
pub(crate) mod header;
pub(crate) mod keys;
pub(crate) mod signature;
pub(crate) mod token;
pub(crate) mod utils;
pub(crate) mod validator;

// Public Interface
pub use algorithm::{AlgorithmPolicy, AlgorithmType};
pub use certificate::Certificate;
pub use claims::{ClaimsValidation, ValidatedClaims, validate, validate_with};
pub use error::{
    DecodeError, Error, ErrorKind, KeyError, Result, ValidationError, VerificationError,
};
pub use header::TokenHeader;
pub use keys::{KeyFamily, TrustedKey};
pub use signature::verify;
pub use token::{DecodedToken, decode};
pub use validator::{CertificateVerifier, VerificationResult, verify_token};

pub(crate) mod limits;
