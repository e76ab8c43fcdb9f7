//! Base64URL encoding/decoding per RFC 4648
//!
//! This module provides a thin wrapper around the `base64` crate with
//! size limit validation and the segment alphabet check.

use crate::error::DecodeError;
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

/// URL-safe engine that accepts segments with or without correct padding
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Check a segment is base64url data with at most two trailing `=`
pub(crate) fn is_segment_alphabet(segment: &str) -> bool {
    let body = segment.trim_end_matches('=');
    !body.is_empty()
        && segment.len() - body.len() <= 2
        && body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Decode Base64URL string to bytes with maximum size limit
pub(crate) fn decode_bytes(input: &str, max_size: usize) -> Result<Vec<u8>, DecodeError> {
    // Reject before decoding: 4 chars carry 3 bytes
    if input.len() / 4 * 3 > max_size + 3 {
        return Err(DecodeError::InvalidEncoding(format!(
            "Encoded size exceeds limit: {} chars (max decoded: {} bytes)",
            input.len(),
            max_size
        )));
    }

    let result = URL_SAFE_LENIENT
        .decode(input)
        .map_err(|e| DecodeError::InvalidEncoding(e.to_string()))?;

    if result.len() > max_size {
        return Err(DecodeError::InvalidEncoding(format!(
            "Decoded size exceeds limit: {} bytes (max: {})",
            result.len(),
            max_size
        )));
    }

    Ok(result)
}

/// Encode bytes without padding
#[cfg(test)]
pub(crate) fn encode_bytes(input: impl AsRef<[u8]>) -> String {
    URL_SAFE_LENIENT.encode(input)
}
