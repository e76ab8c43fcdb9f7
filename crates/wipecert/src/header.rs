use miniserde::json::{Object, Value};

/// Token header
///
/// Keeps every header parameter as decoded. Only `alg` is interpreted, and
/// only by the validator.
#[derive(Debug, Clone)]
pub struct TokenHeader {
    params: Object,
}

/// Outcome of reading `alg`, which may be missing or not a string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderAlgorithm<'a> {
    Named(&'a str),
    NotAString,
    Missing,
}

impl TokenHeader {
    pub(crate) fn new(params: Object) -> Self {
        Self { params }
    }

    /// Algorithm parameter as it appears in the header
    pub fn algorithm(&self) -> Option<&str> {
        match self.params.get("alg") {
            Some(Value::String(alg)) => Some(alg.as_str()),
            _ => None,
        }
    }

    pub(crate) fn algorithm_param(&self) -> HeaderAlgorithm<'_> {
        match self.params.get("alg") {
            Some(Value::String(alg)) => HeaderAlgorithm::Named(alg.as_str()),
            Some(_) => HeaderAlgorithm::NotAString,
            None => HeaderAlgorithm::Missing,
        }
    }

    /// Key ID, informational only since exactly one key is trusted
    pub fn key_id(&self) -> Option<&str> {
        match self.params.get("kid") {
            Some(Value::String(kid)) => Some(kid.as_str()),
            _ => None,
        }
    }

    /// Whether the header lists critical extensions (RFC 7515 Section 4.1.11)
    pub(crate) fn has_critical(&self) -> bool {
        self.params.contains_key("crit")
    }

    /// All header parameters
    pub fn params(&self) -> &Object {
        &self.params
    }
}
