//! Size limit constants for input validation

/// Maximum length for a certificate token string (8KB)
/// A QR code holds at most 2953 bytes of binary data, so anything larger did
/// not come from a scan
pub(crate) const MAX_TOKEN_LENGTH: usize = 8 * 1024;

// ============================================================================
// Decoded segment size limits
// ============================================================================

/// Maximum size for decoded header JSON (8KB)
pub(crate) const MAX_DECODED_HEADER_SIZE: usize = 8 * 1024;

/// Maximum size for decoded payload JSON (8KB)
pub(crate) const MAX_DECODED_PAYLOAD_SIZE: usize = 8 * 1024;

/// Maximum size for decoded signature bytes (1KB)
/// RS256 with a 4096-bit key is 512 bytes, ES256 is 64
pub(crate) const MAX_DECODED_SIGNATURE_SIZE: usize = 1024;

// ============================================================================
// Header field size limits
// ============================================================================

/// Maximum length for algorithm (alg) field in the header (16 bytes)
pub(crate) const MAX_ALG_LENGTH: usize = 16;

// ============================================================================
// Timestamp bounds
// ============================================================================

/// Minimum valid Unix timestamp (1970-01-01 00:00:00 UTC)
pub(crate) const MIN_TIMESTAMP: i64 = 0;

/// Maximum valid Unix timestamp (2100-01-01 00:00:00 UTC)
pub(crate) const MAX_TIMESTAMP: i64 = 4_102_444_800;

// ============================================================================
// Validation bounds
// ============================================================================

/// Default tolerance for verifier clocks running behind the issuer (5 minutes)
pub(crate) const DEFAULT_CLOCK_SKEW_SECONDS: u64 = 300;

/// Maximum clock skew tolerance (1 hour)
pub(crate) const MAX_CLOCK_SKEW_SECONDS: u64 = 3600;

/// Maximum certificate age, the whole plausible timestamp range
/// Any larger value accepts the same certificates
pub(crate) const MAX_MAX_AGE_SECONDS: u64 = MAX_TIMESTAMP as u64;
