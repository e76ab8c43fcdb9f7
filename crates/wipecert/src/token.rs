//! Compact token decoding
//!
//! A certificate token is `base64url(header).base64url(payload).base64url(signature)`.
//! Decoding happens in stages on a borrowed [`RawToken`] so the caller can
//! interleave checks (the algorithm allow-list runs right after the header
//! is decoded). [`decode`] runs every stage in order.
//!
//! The signing input is always the exact slice of the scanned string in
//! front of the last `.`. Header and payload are never re-serialized.

use crate::error::DecodeError;
use crate::header::TokenHeader;
use crate::limits::{
    MAX_DECODED_HEADER_SIZE, MAX_DECODED_PAYLOAD_SIZE, MAX_DECODED_SIGNATURE_SIZE,
    MAX_TOKEN_LENGTH,
};
use crate::utils::base64url;
use miniserde::json::{Object, Value};

/// A scanned string split into its three segments
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawToken<'a> {
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
    signing_input: &'a str,
}

impl<'a> RawToken<'a> {
    /// Check the shape of the scanned string and split it
    ///
    /// The signature segment may still be empty afterwards.
    pub(crate) fn split(raw: &'a str) -> Result<Self, DecodeError> {
        if raw.len() > MAX_TOKEN_LENGTH {
            return Err(DecodeError::TokenTooLarge {
                size: raw.len(),
                max: MAX_TOKEN_LENGTH,
            });
        }

        let (signing_input, signature) = raw.rsplit_once('.').ok_or(
            DecodeError::MalformedStructure("expected three parts separated by '.'"),
        )?;
        let (header, payload) = signing_input.split_once('.').ok_or(
            DecodeError::MalformedStructure("expected three parts separated by '.'"),
        )?;
        if payload.contains('.') {
            return Err(DecodeError::MalformedStructure(
                "expected three parts separated by '.'",
            ));
        }

        if header.is_empty() || payload.is_empty() {
            return Err(DecodeError::MalformedStructure("empty segment"));
        }

        // an empty signature is reported later, after the algorithm check
        if !base64url::is_segment_alphabet(header)
            || !base64url::is_segment_alphabet(payload)
            || !(signature.is_empty() || base64url::is_segment_alphabet(signature))
        {
            return Err(DecodeError::MalformedStructure(
                "unexpected character outside the base64url alphabet",
            ));
        }

        Ok(Self {
            header,
            payload,
            signature,
            signing_input,
        })
    }

    /// Decode the header segment
    pub(crate) fn header(&self) -> Result<TokenHeader, DecodeError> {
        let header = TokenHeader::new(decode_object(
            self.header,
            MAX_DECODED_HEADER_SIZE,
            "header",
        )?);

        if header.has_critical() {
            return Err(DecodeError::InvalidStructure(
                "unsupported critical header parameters".into(),
            ));
        }

        Ok(header)
    }

    /// Decode the payload segment
    pub(crate) fn payload(&self) -> Result<Object, DecodeError> {
        decode_object(self.payload, MAX_DECODED_PAYLOAD_SIZE, "payload")
    }

    pub(crate) fn ensure_signature_present(&self) -> Result<(), DecodeError> {
        if self.signature.is_empty() {
            return Err(DecodeError::MalformedStructure("empty signature segment"));
        }
        Ok(())
    }

    /// Decode the signature segment into raw bytes
    pub(crate) fn signature(&self) -> Result<Vec<u8>, DecodeError> {
        self.ensure_signature_present()?;
        base64url::decode_bytes(self.signature, MAX_DECODED_SIGNATURE_SIZE)
    }

    /// `header.payload` exactly as scanned
    pub(crate) fn signing_input(&self) -> &'a [u8] {
        self.signing_input.as_bytes()
    }
}

/// Decode a base64url segment holding a JSON object
fn decode_object(segment: &str, max_size: usize, part: &str) -> Result<Object, DecodeError> {
    let bytes = base64url::decode_bytes(segment, max_size)?;
    let json = std::str::from_utf8(&bytes)
        .map_err(|e| DecodeError::InvalidStructure(format!("{part} is not UTF-8: {e}")))?;

    match miniserde::json::from_str::<Value>(json) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(DecodeError::InvalidStructure(format!(
            "{part} is not a JSON object"
        ))),
        Err(e) => Err(DecodeError::InvalidStructure(format!(
            "Failed to parse {part}: {e}"
        ))),
    }
}

/// A token split and decoded, signature not yet checked
///
/// Nothing in here is trustworthy until the signature has been verified
/// over [`DecodedToken::signing_input`].
#[derive(Debug, Clone)]
pub struct DecodedToken {
    header: TokenHeader,
    payload: Object,
    signing_input: Vec<u8>,
    signature: Vec<u8>,
}

impl DecodedToken {
    /// Decoded header
    pub fn header(&self) -> &TokenHeader {
        &self.header
    }

    /// Decoded payload (unverified)
    pub fn payload(&self) -> &Object {
        &self.payload
    }

    /// Bytes the signature covers
    pub fn signing_input(&self) -> &[u8] {
        &self.signing_input
    }

    /// Raw signature bytes
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

/// Decode a scanned certificate token
///
/// Fails with `MalformedStructure` unless `raw` is exactly three non-empty
/// base64url segments, `InvalidEncoding` when a segment does not decode,
/// and `InvalidStructure` when header or payload is not a JSON object.
pub fn decode(raw: &str) -> Result<DecodedToken, DecodeError> {
    let token = RawToken::split(raw)?;
    token.ensure_signature_present()?;

    let header = token.header()?;
    let payload = token.payload()?;
    let signature = token.signature()?;

    Ok(DecodedToken {
        header,
        payload,
        signing_input: token.signing_input().to_vec(),
        signature,
    })
}
