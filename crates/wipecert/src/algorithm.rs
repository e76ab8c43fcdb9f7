//! Algorithm support for certificate verification
use crate::error::ValidationError;
use crate::keys::KeyFamily;
use crate::limits::MAX_ALG_LENGTH;

use aws_lc_rs::signature;

/// Algorithm identifier from the token header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmType {
    /// ECDSA P-256 with SHA-256
    ES256,
    /// RSASSA-PKCS1-v1_5 with SHA-256
    RS256,
}

impl AlgorithmType {
    pub(crate) fn from_str(s: &str) -> Result<Self, ValidationError> {
        // Validate algorithm string length before echoing it in errors
        if s.len() > MAX_ALG_LENGTH {
            return Err(ValidationError::UnsupportedAlgorithm(format!(
                "Algorithm string too long: {} bytes (maximum: {} bytes)",
                s.len(),
                MAX_ALG_LENGTH
            )));
        }

        match s {
            "ES256" => Ok(AlgorithmType::ES256),
            "RS256" => Ok(AlgorithmType::RS256),
            // "None", "NONE" and friends are the same attack
            _ if s.eq_ignore_ascii_case("none") => Err(ValidationError::AlgorithmNoneRejected),
            _ => Err(ValidationError::UnsupportedAlgorithm(s.into())),
        }
    }

    /// Convert to string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlgorithmType::ES256 => "ES256",
            AlgorithmType::RS256 => "RS256",
        }
    }

    /// Key family this algorithm verifies with
    pub const fn key_family(&self) -> KeyFamily {
        match self {
            AlgorithmType::ES256 => KeyFamily::EcdsaP256,
            AlgorithmType::RS256 => KeyFamily::Rsa,
        }
    }

    /// Get the verification algorithm for signature verification
    ///
    /// Note: JWS ECDSA signatures use IEEE P1363 format (fixed-length R||S),
    /// not ASN.1 DER encoding, as per RFC 7518 Section 3.4.
    pub(crate) fn verification_algorithm(&self) -> &'static dyn signature::VerificationAlgorithm {
        match self {
            AlgorithmType::ES256 => &signature::ECDSA_P256_SHA256_FIXED,
            AlgorithmType::RS256 => &signature::RSA_PKCS1_2048_8192_SHA256,
        }
    }
}

impl std::fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for AlgorithmType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Policy for allowed algorithms
///
/// The default allows ES256 and RS256, the two algorithms certificate
/// issuers sign with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmPolicy {
    allowed: Vec<AlgorithmType>,
}

impl AlgorithmPolicy {
    /// Policy that allows only ES256
    pub fn es256_only() -> Self {
        Self::allow_only(vec![AlgorithmType::ES256])
    }

    /// Policy that allows only RS256
    pub fn rs256_only() -> Self {
        Self::allow_only(vec![AlgorithmType::RS256])
    }

    /// Create a policy that allows only specific algorithms
    pub fn allow_only(algorithms: Vec<AlgorithmType>) -> Self {
        Self {
            allowed: algorithms,
        }
    }

    /// Parse the header algorithm and check it against the policy
    pub(crate) fn resolve(&self, alg: &str) -> Result<AlgorithmType, ValidationError> {
        let algorithm = AlgorithmType::from_str(alg)?;
        self.validate(&algorithm)?;
        Ok(algorithm)
    }

    /// Validate algorithm against policy
    pub(crate) fn validate(&self, algorithm: &AlgorithmType) -> Result<(), ValidationError> {
        if self.is_allowed(algorithm) {
            Ok(())
        } else {
            Err(ValidationError::AlgorithmNotAllowed {
                found: algorithm.to_string(),
                allowed: self.allowed.iter().map(ToString::to_string).collect(),
            })
        }
    }

    /// Check if an algorithm is allowed
    pub fn is_allowed(&self, algorithm: &AlgorithmType) -> bool {
        self.allowed.contains(algorithm)
    }
}

impl Default for AlgorithmPolicy {
    fn default() -> Self {
        Self::allow_only(vec![AlgorithmType::ES256, AlgorithmType::RS256])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!(AlgorithmType::from_str("ES256").unwrap(), AlgorithmType::ES256);
        assert_eq!(AlgorithmType::from_str("RS256").unwrap(), AlgorithmType::RS256);

        for none in ["none", "None", "NONE", "nOnE"] {
            assert!(matches!(
                AlgorithmType::from_str(none),
                Err(ValidationError::AlgorithmNoneRejected)
            ));
        }

        for other in ["HS256", "ES384", "RS512", "PS256", "EdDSA", "es256", "", "UNKNOWN"] {
            assert!(
                matches!(
                    AlgorithmType::from_str(other),
                    Err(ValidationError::UnsupportedAlgorithm(_))
                ),
                "{other} should be unsupported"
            );
        }
    }

    #[test]
    fn test_algorithm_too_long() {
        let long = "ES256".repeat(10);
        assert!(matches!(
            AlgorithmType::from_str(&long),
            Err(ValidationError::UnsupportedAlgorithm(msg)) if msg.contains("too long")
        ));
    }

    #[test]
    fn test_algorithm_display() {
        assert_eq!(format!("{}", AlgorithmType::ES256), "ES256");
        assert_eq!(format!("{}", AlgorithmType::RS256), "RS256");
    }

    #[test]
    fn test_key_family() {
        assert_eq!(AlgorithmType::ES256.key_family(), KeyFamily::EcdsaP256);
        assert_eq!(AlgorithmType::RS256.key_family(), KeyFamily::Rsa);
    }

    #[test]
    fn test_default_policy() {
        let policy = AlgorithmPolicy::default();
        assert_eq!(policy.resolve("ES256").unwrap(), AlgorithmType::ES256);
        assert_eq!(policy.resolve("RS256").unwrap(), AlgorithmType::RS256);
        assert!(matches!(
            policy.resolve("none"),
            Err(ValidationError::AlgorithmNoneRejected)
        ));
    }

    #[test]
    fn test_restricted_policy() {
        let policy = AlgorithmPolicy::es256_only();
        assert!(policy.resolve("ES256").is_ok());
        assert!(matches!(
            policy.resolve("RS256"),
            Err(ValidationError::AlgorithmNotAllowed { found, allowed })
                if found == "RS256" && allowed == vec!["ES256".to_string()]
        ));

        let policy = AlgorithmPolicy::rs256_only();
        assert!(policy.resolve("RS256").is_ok());
        assert!(policy.resolve("ES256").is_err());
    }
}
