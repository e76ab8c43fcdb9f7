//! Typed view over a verified wipe certificate payload

use miniserde::json::{Number, Object, Value};

/// Characters of `dataHash` shown when a certificate has no id
const DISPLAY_HASH_LENGTH: usize = 16;

/// Read-only view of a verified certificate payload
///
/// Only handed out by [`VerificationResult::certificate`] for tokens whose
/// signature verified, so every accessor reads trusted data. Fields the
/// issuer did not include, or included with an unexpected type, read as
/// `None`.
///
/// [`VerificationResult::certificate`]: crate::VerificationResult::certificate
#[derive(Debug, Clone, Copy)]
pub struct Certificate<'a> {
    payload: &'a Object,
}

impl<'a> Certificate<'a> {
    pub(crate) fn new(payload: &'a Object) -> Self {
        Self { payload }
    }

    /// `deviceID`
    pub fn device_id(&self) -> Option<&'a str> {
        self.string("deviceID")
    }

    /// `deviceType`, e.g. `HDD` or `SSD`
    pub fn device_type(&self) -> Option<&'a str> {
        self.string("deviceType")
    }

    /// `iss`
    pub fn issuer(&self) -> Option<&'a str> {
        self.string("iss")
    }

    /// `iat`, seconds since the Unix epoch
    pub fn issued_at(&self) -> Option<i64> {
        self.integer("iat")
    }

    pub fn certificate_id(&self) -> Option<&'a str> {
        self.string("certificateID")
    }

    pub fn data_hash(&self) -> Option<&'a str> {
        self.string("dataHash")
    }

    pub fn wipe_method(&self) -> Option<&'a str> {
        self.string("wipeMethod")
    }

    pub fn wipe_status(&self) -> Option<&'a str> {
        self.string("wipeStatus")
    }

    /// `wipeTimestamp`, seconds since the Unix epoch
    pub fn wipe_timestamp(&self) -> Option<i64> {
        self.integer("wipeTimestamp")
    }

    /// Short identifier for display
    ///
    /// The certificate id when present, otherwise the data hash cut to 16
    /// characters with a trailing `...`.
    pub fn display_id(&self) -> Option<String> {
        if let Some(id) = self.certificate_id() {
            return Some(id.to_string());
        }

        self.data_hash().map(|hash| {
            match hash.char_indices().nth(DISPLAY_HASH_LENGTH) {
                Some((cut, _)) => format!("{}...", &hash[..cut]),
                None => hash.to_string(),
            }
        })
    }

    /// Every payload claim, including ones without an accessor
    pub fn claims(&self) -> &'a Object {
        self.payload
    }

    fn string(&self, claim: &str) -> Option<&'a str> {
        match self.payload.get(claim) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    fn integer(&self, claim: &str) -> Option<i64> {
        match self.payload.get(claim) {
            Some(Value::Number(Number::U64(n))) => i64::try_from(*n).ok(),
            Some(Value::Number(Number::I64(n))) => Some(*n),
            _ => None,
        }
    }
}
