//! Claims validation for certificate tokens
//!
//! Runs before the signature check and only decides whether a token is
//! worth verifying. Nothing checked here is trusted until the signature
//! verifies.

use crate::algorithm::{AlgorithmPolicy, AlgorithmType};
use crate::error::ValidationError;
use crate::header::{HeaderAlgorithm, TokenHeader};
use crate::limits::{DEFAULT_CLOCK_SKEW_SECONDS, MAX_CLOCK_SKEW_SECONDS, MAX_MAX_AGE_SECONDS};
use crate::utils::bounds::{apply_clock_skew, validate_timestamp_bounds};
use miniserde::json::{Number, Object, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// Issued-at claim name
pub const ISSUED_AT: &str = "iat";

/// Configuration for claims validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsValidation {
    required_claims: Vec<String>,
    clock_skew_seconds: u64,
    max_age_seconds: Option<u64>,
}

impl Default for ClaimsValidation {
    fn default() -> Self {
        Self {
            required_claims: vec![ISSUED_AT.to_string()],
            clock_skew_seconds: DEFAULT_CLOCK_SKEW_SECONDS,
            max_age_seconds: None,
        }
    }
}

impl ClaimsValidation {
    /// Create a new validation config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Require an additional payload claim, e.g. `deviceID`
    pub fn require_claim(mut self, claim: impl Into<String>) -> Self {
        let claim = claim.into();
        if !self.required_claims.contains(&claim) {
            self.required_claims.push(claim);
        }
        self
    }

    /// Set clock skew tolerance for issued-at
    ///
    /// # Security
    /// Values above 3600 seconds are clamped so a misconfiguration cannot
    /// disable the future-timestamp check.
    pub fn clock_skew(mut self, seconds: u64) -> Self {
        if seconds > MAX_CLOCK_SKEW_SECONDS {
            tracing::warn!(
                requested = seconds,
                max = MAX_CLOCK_SKEW_SECONDS,
                "clock skew clamped"
            );
        }
        self.clock_skew_seconds = seconds.min(MAX_CLOCK_SKEW_SECONDS);
        self
    }

    /// Reject certificates issued more than `seconds` ago
    ///
    /// Off by default: a wipe certificate does not expire. Values above the
    /// plausible timestamp range are clamped to it.
    pub fn max_age(mut self, seconds: u64) -> Self {
        if seconds > MAX_MAX_AGE_SECONDS {
            tracing::warn!(
                requested = seconds,
                max = MAX_MAX_AGE_SECONDS,
                "max age clamped"
            );
        }
        self.max_age_seconds = Some(seconds.min(MAX_MAX_AGE_SECONDS));
        self
    }

    pub fn required_claims(&self) -> &[String] {
        &self.required_claims
    }

    /// Validate payload claims against the current time
    pub(crate) fn validate_payload(&self, payload: &Object) -> Result<i64, ValidationError> {
        self.validate_payload_at(payload, current_timestamp())
    }

    fn validate_payload_at(&self, payload: &Object, now: i64) -> Result<i64, ValidationError> {
        // iat is always required, whatever else was configured
        let issued_at = payload
            .get(ISSUED_AT)
            .ok_or_else(|| ValidationError::MissingClaim(ISSUED_AT.into()))?;

        if let Some(missing) = self
            .required_claims
            .iter()
            .find(|claim| !payload.contains_key(claim.as_str()))
        {
            return Err(ValidationError::MissingClaim(missing.clone()));
        }

        let issued_at = timestamp_value(ISSUED_AT, issued_at)?;
        validate_timestamp_bounds(issued_at)?;

        let now_with_skew = apply_clock_skew(now, self.clock_skew_seconds, true)?;
        if issued_at > now_with_skew {
            return Err(ValidationError::IssuedInFuture {
                issued_at,
                now,
                skew: self.clock_skew_seconds,
            });
        }

        if let Some(max_age) = self.max_age_seconds {
            let oldest_accepted = apply_clock_skew(now, max_age, false)?;
            if issued_at < oldest_accepted {
                return Err(ValidationError::TooOld {
                    issued_at,
                    now,
                    max_age,
                });
            }
        }

        Ok(issued_at)
    }
}

/// Claims that passed validation, pending signature verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedClaims {
    algorithm: AlgorithmType,
    issued_at: i64,
}

impl ValidatedClaims {
    /// Allow-listed algorithm the signature must be checked with
    pub fn algorithm(&self) -> AlgorithmType {
        self.algorithm
    }

    /// Issued-at, seconds since the Unix epoch
    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }
}

/// Resolve the header algorithm against the allow-list
pub(crate) fn validate_algorithm(
    header: &TokenHeader,
    policy: &AlgorithmPolicy,
) -> Result<AlgorithmType, ValidationError> {
    match header.algorithm_param() {
        HeaderAlgorithm::Named(alg) => policy.resolve(alg),
        HeaderAlgorithm::NotAString => Err(ValidationError::UnsupportedAlgorithm(
            "'alg' is not a string".into(),
        )),
        HeaderAlgorithm::Missing => Err(ValidationError::UnsupportedAlgorithm(
            "header has no 'alg'".into(),
        )),
    }
}

/// Validate header and payload with an explicit policy and configuration
pub fn validate_with(
    header: &TokenHeader,
    payload: &Object,
    policy: &AlgorithmPolicy,
    config: &ClaimsValidation,
) -> Result<ValidatedClaims, ValidationError> {
    let algorithm = validate_algorithm(header, policy)?;
    let issued_at = config.validate_payload(payload)?;
    Ok(ValidatedClaims {
        algorithm,
        issued_at,
    })
}

/// Validate header and payload with the default allow-list and configuration
///
/// The algorithm is checked first, so an unsigned or unknown algorithm is
/// reported regardless of the payload.
pub fn validate(header: &TokenHeader, payload: &Object) -> Result<ValidatedClaims, ValidationError> {
    validate_with(
        header,
        payload,
        &AlgorithmPolicy::default(),
        &ClaimsValidation::default(),
    )
}

/// Read an integer timestamp claim
fn timestamp_value(claim: &str, value: &Value) -> Result<i64, ValidationError> {
    match value {
        Value::Number(Number::U64(n)) => {
            i64::try_from(*n).map_err(|_| ValidationError::TimestampOutOfBounds {
                value: i64::MAX,
                min: crate::limits::MIN_TIMESTAMP,
                max: crate::limits::MAX_TIMESTAMP,
            })
        }
        Value::Number(Number::I64(n)) => Ok(*n),
        _ => Err(ValidationError::TimestampNotInteger {
            claim: claim.into(),
        }),
    }
}

/// Get current Unix timestamp
fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| std::time::Duration::from_secs(0))
        .as_secs() as i64
}
