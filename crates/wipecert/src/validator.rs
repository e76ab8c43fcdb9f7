use crate::algorithm::AlgorithmPolicy;
use crate::certificate::Certificate;
use crate::claims::{ClaimsValidation, validate_algorithm};
use crate::error::{ErrorKind, Result};
use crate::keys::TrustedKey;
use crate::signature;
use crate::token::RawToken;
use miniserde::Serialize;
use miniserde::json::Object;

/// Certificate token verifier
///
/// Configured once and reused for any number of tokens. Verification
/// always uses the embedded trusted key; only the algorithm allow-list and
/// claim checks are configurable.
#[derive(Debug, Clone, Default)]
pub struct CertificateVerifier {
    config_algorithms: AlgorithmPolicy,
    config_claims: ClaimsValidation,
}

impl CertificateVerifier {
    /// Create a new verifier with secure defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the algorithm policy
    pub fn algorithms(&mut self, policy: AlgorithmPolicy) -> &mut Self {
        self.config_algorithms = policy;
        self
    }

    /// Configure claims validation
    pub fn validate(&mut self, config: ClaimsValidation) -> &mut Self {
        self.config_claims = config;
        self
    }

    pub fn build(&mut self) -> Self {
        self.clone()
    }
}

impl CertificateVerifier {
    /// Verify a scanned certificate token
    ///
    /// Never fails and never panics: every rejection is reported inside the
    /// returned [`VerificationResult`].
    pub fn verify_token(&self, raw: &str) -> VerificationResult {
        match self.try_verify(raw) {
            Ok(payload) => {
                let result = VerificationResult::valid(payload);
                let certificate = result.certificate().and_then(|cert| cert.display_id());
                tracing::debug!(
                    certificate = certificate.as_deref().unwrap_or("-"),
                    "certificate verified"
                );
                result
            }
            Err(e) => {
                let kind = e.kind();
                tracing::debug!(kind = kind.as_str(), "certificate rejected");
                VerificationResult::invalid(kind, e.to_string())
            }
        }
    }

    fn try_verify(&self, raw: &str) -> Result<Object> {
        // 1. Shape (an empty signature is reported after the algorithm)
        let token = RawToken::split(raw)?;

        // 2-3. Header, then the allow-list before anything else is decoded
        let header = token.header()?;
        let algorithm = validate_algorithm(&header, &self.config_algorithms)?;

        // 4. Remaining segments
        token.ensure_signature_present()?;
        let payload = token.payload()?;
        let signature = token.signature()?;

        // 5. Claims
        self.config_claims.validate_payload(&payload)?;

        // 6. Signature over the verbatim signing input
        let key = TrustedKey::embedded().inspect_err(|e| {
            tracing::error!(error = %e, "embedded trusted key failed to load");
        })?;
        signature::verify(token.signing_input(), &signature, algorithm, key)?;

        Ok(payload)
    }
}

/// Verify a scanned certificate token with the default configuration
///
/// Allows ES256 and RS256, requires `iat`, and tolerates 300 seconds of
/// clock skew.
pub fn verify_token(raw: &str) -> VerificationResult {
    CertificateVerifier::new().verify_token(raw)
}

/// Outcome of verifying one token
///
/// `payload` is present exactly when the token is valid. `error_kind` and
/// `message` are present exactly when it is not.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    valid: bool,
    payload: Option<Object>,
    #[serde(rename = "errorKind")]
    error_kind: Option<ErrorKind>,
    message: Option<String>,
}

impl VerificationResult {
    fn valid(payload: Object) -> Self {
        Self {
            valid: true,
            payload: Some(payload),
            error_kind: None,
            message: None,
        }
    }

    fn invalid(kind: ErrorKind, message: String) -> Self {
        Self {
            valid: false,
            payload: None,
            error_kind: Some(kind),
            message: Some(message),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Verified payload, exactly as decoded
    pub fn payload(&self) -> Option<&Object> {
        self.payload.as_ref()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }

    /// Human-readable rejection reason
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Typed view of the verified payload
    pub fn certificate(&self) -> Option<Certificate<'_>> {
        self.payload.as_ref().map(Certificate::new)
    }

    /// Serialize as `{"valid":..,"payload":..,"errorKind":..,"message":..}`
    pub fn to_json(&self) -> String {
        miniserde::json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::base64url::encode_bytes;
    use aws_lc_rs::rand::SystemRandom;
    use aws_lc_rs::signature::{ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaKeyPair};
    use miniserde::json::Value;

    const FIXTURE_TOKEN: &str = include_str!("../tests/fixtures/oblivion_es256.jwt");
    const ISSUER_SIGNING_KEY_PEM: &str = include_str!("../tests/fixtures/issuer_signing_key.pem");

    fn sign_token(header: &str, payload: &str) -> String {
        let (_, pkcs8) = der::pem::decode_vec(ISSUER_SIGNING_KEY_PEM.as_bytes()).unwrap();
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &pkcs8).unwrap();
        let signing_input = format!("{}.{}", encode_bytes(header), encode_bytes(payload));
        let signature = key_pair
            .sign(&SystemRandom::new(), signing_input.as_bytes())
            .unwrap();
        format!("{signing_input}.{}", encode_bytes(signature.as_ref()))
    }

    #[test]
    fn test_fixture_token() {
        let result = verify_token(FIXTURE_TOKEN.trim());

        assert!(result.is_valid(), "{:?}", result.message());
        assert_eq!(result.error_kind(), None);
        assert_eq!(result.message(), None);

        let cert = result.certificate().unwrap();
        assert_eq!(cert.device_id(), Some("DEV-0001-ABCD"));
        assert_eq!(cert.device_type(), Some("HDD"));
        assert_eq!(cert.issued_at(), Some(1_700_000_000));
        assert_eq!(cert.issuer(), Some("Oblivion v1.0"));
        assert_eq!(result.payload().unwrap().len(), 4);
    }

    #[test]
    fn test_none_reported_before_signature_and_payload() {
        let raw = format!("{}.bm90IGpzb24.", encode_bytes(r#"{"alg":"none"}"#));
        let result = verify_token(&raw);

        assert!(!result.is_valid());
        assert!(result.payload().is_none());
        assert!(result.certificate().is_none());
        assert_eq!(result.error_kind(), Some(ErrorKind::UnsupportedAlgorithm));
    }

    #[test]
    fn test_empty_signature_after_algorithm() {
        let raw = format!(
            "{}.{}.",
            encode_bytes(r#"{"alg":"ES256"}"#),
            encode_bytes(r#"{"iat":1700000000}"#)
        );
        assert_eq!(
            verify_token(&raw).error_kind(),
            Some(ErrorKind::MalformedStructure)
        );
    }

    #[test]
    fn test_claims_before_signature() {
        // Garbage signature, but the missing claim is reported first
        let raw = format!(
            "{}.{}.c2ln",
            encode_bytes(r#"{"alg":"ES256"}"#),
            encode_bytes(r#"{"deviceID":"DEV-1"}"#)
        );
        assert_eq!(verify_token(&raw).error_kind(), Some(ErrorKind::MissingClaim));
    }

    #[test]
    fn test_configured_verifier() {
        let token = sign_token(r#"{"alg":"ES256"}"#, r#"{"iat":1700000000}"#);
        assert!(verify_token(&token).is_valid());

        let verifier = CertificateVerifier::new()
            .validate(ClaimsValidation::new().require_claim("deviceID"))
            .build();
        assert_eq!(
            verifier.verify_token(&token).error_kind(),
            Some(ErrorKind::MissingClaim)
        );

        let verifier = CertificateVerifier::new()
            .algorithms(AlgorithmPolicy::rs256_only())
            .build();
        assert_eq!(
            verifier.verify_token(&token).error_kind(),
            Some(ErrorKind::UnsupportedAlgorithm)
        );
    }

    #[test]
    fn test_payload_kept_verbatim() {
        let payload = r#"{"iat":1700000000,"nested":{"a":[1,2,3]},"wipeStatus":"SUCCESS","x-extra":null}"#;
        let token = sign_token(r#"{"alg":"ES256","typ":"JWT"}"#, payload);
        let result = verify_token(&token);

        assert!(result.is_valid(), "{:?}", result.message());
        let verified = result.payload().unwrap();
        assert_eq!(verified.len(), 4);
        assert!(matches!(verified.get("x-extra"), Some(Value::Null)));
        assert!(matches!(verified.get("nested"), Some(Value::Object(_))));
    }

    #[test]
    fn test_to_json() {
        let result = verify_token("not a token");
        let json = result.to_json();

        assert!(json.starts_with(r#"{"valid":false,"payload":null,"errorKind":"MalformedStructure","message":""#));

        let result = verify_token(FIXTURE_TOKEN.trim());
        let json = result.to_json();
        assert!(json.starts_with(r#"{"valid":true,"payload":{"deviceID":"DEV-0001-ABCD""#));
        assert!(json.contains(r#""errorKind":null"#));
    }

    #[test]
    fn test_verifier_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<CertificateVerifier>();
        assert_send_sync::<VerificationResult>();
    }
}
