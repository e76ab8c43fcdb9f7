//! Signature verification against the trusted key

use crate::algorithm::AlgorithmType;
use crate::error::VerificationError;
use crate::keys::TrustedKey;

use aws_lc_rs::signature::UnparsedPublicKey;

/// Verify `signature` over `signing_input` with `key`
///
/// `algorithm` must already have passed the allow-list. Every failure,
/// including a key whose family cannot verify `algorithm`, is reported as
/// [`VerificationError::SignatureMismatch`]. Acceptance is decided by
/// `aws-lc-rs` alone.
pub fn verify(
    signing_input: &[u8],
    signature: &[u8],
    algorithm: AlgorithmType,
    key: &TrustedKey,
) -> Result<(), VerificationError> {
    if algorithm.key_family() != key.family() {
        return Err(VerificationError::SignatureMismatch);
    }

    let public_key = UnparsedPublicKey::new(algorithm.verification_algorithm(), key.spki_der());

    public_key
        .verify(signing_input, signature)
        .map_err(|_| VerificationError::SignatureMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_lc_rs::rand::SystemRandom;
    use aws_lc_rs::signature::{ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaKeyPair};

    const ISSUER_SIGNING_KEY_PEM: &str = include_str!("../tests/fixtures/issuer_signing_key.pem");

    fn issuer_key_pair() -> EcdsaKeyPair {
        let (_, pkcs8) = der::pem::decode_vec(ISSUER_SIGNING_KEY_PEM.as_bytes()).unwrap();
        EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &pkcs8).unwrap()
    }

    fn sign(key_pair: &EcdsaKeyPair, message: &[u8]) -> Vec<u8> {
        let rng = SystemRandom::new();
        key_pair.sign(&rng, message).unwrap().as_ref().to_vec()
    }

    #[test]
    fn test_verify_es256() {
        let key = TrustedKey::embedded().unwrap();
        let signature = sign(&issuer_key_pair(), b"header.payload");

        assert_eq!(signature.len(), 64);
        assert!(verify(b"header.payload", &signature, AlgorithmType::ES256, key).is_ok());
    }

    #[test]
    fn test_verify_wrong_input() {
        let key = TrustedKey::embedded().unwrap();
        let signature = sign(&issuer_key_pair(), b"header.payload");

        assert_eq!(
            verify(b"header.payloaD", &signature, AlgorithmType::ES256, key),
            Err(VerificationError::SignatureMismatch)
        );
    }

    #[test]
    fn test_verify_bit_flips() {
        let key = TrustedKey::embedded().unwrap();
        let signature = sign(&issuer_key_pair(), b"header.payload");

        for bit in [0, 7, 255, 256, 511] {
            let mut flipped = signature.clone();
            flipped[bit / 8] ^= 1 << (bit % 8);
            assert_eq!(
                verify(b"header.payload", &flipped, AlgorithmType::ES256, key),
                Err(VerificationError::SignatureMismatch),
                "bit {bit}"
            );
        }
    }

    #[test]
    fn test_verify_malformed_signature() {
        let key = TrustedKey::embedded().unwrap();
        for signature in [&[][..], &[0u8; 63][..], &[0u8; 64][..], &[0xffu8; 64][..]] {
            assert_eq!(
                verify(b"header.payload", signature, AlgorithmType::ES256, key),
                Err(VerificationError::SignatureMismatch)
            );
        }
    }

    #[test]
    fn test_verify_der_signature_rejected() {
        // ASN.1 DER signatures are not the JWS encoding
        let key = TrustedKey::embedded().unwrap();
        let rng = SystemRandom::new();
        let (_, pkcs8) = der::pem::decode_vec(ISSUER_SIGNING_KEY_PEM.as_bytes()).unwrap();
        let der_pair = EcdsaKeyPair::from_pkcs8(
            &aws_lc_rs::signature::ECDSA_P256_SHA256_ASN1_SIGNING,
            &pkcs8,
        )
        .unwrap();
        let signature = der_pair.sign(&rng, b"header.payload").unwrap();

        assert_eq!(
            verify(b"header.payload", signature.as_ref(), AlgorithmType::ES256, key),
            Err(VerificationError::SignatureMismatch)
        );
    }

    #[test]
    fn test_verify_algorithm_key_mismatch() {
        // An RS256 claim can never verify against the P-256 anchor
        let key = TrustedKey::embedded().unwrap();
        let signature = sign(&issuer_key_pair(), b"header.payload");

        assert_eq!(
            verify(b"header.payload", &signature, AlgorithmType::RS256, key),
            Err(VerificationError::SignatureMismatch)
        );
    }

    #[test]
    fn test_verify_rs256() {
        use aws_lc_rs::signature::{RSA_PKCS1_SHA256, RsaKeyPair};
        use rsa::{
            RsaPrivateKey,
            pkcs8::{EncodePrivateKey, EncodePublicKey},
        };

        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("Failed to generate key");
        let pkcs8_doc = private_key
            .to_pkcs8_der()
            .expect("Failed to serialize to PKCS#8");
        let spki = private_key.to_public_key().to_public_key_der().unwrap();
        let key = TrustedKey::from_spki_der(spki.as_bytes()).unwrap();

        let keypair = RsaKeyPair::from_pkcs8(pkcs8_doc.as_bytes()).unwrap();
        let rng = SystemRandom::new();
        let mut signature = vec![0u8; keypair.public_modulus_len()];
        keypair
            .sign(&RSA_PKCS1_SHA256, &rng, b"header.payload", &mut signature)
            .unwrap();

        assert!(verify(b"header.payload", &signature, AlgorithmType::RS256, &key).is_ok());
        assert_eq!(
            verify(b"header.payload", &signature, AlgorithmType::ES256, &key),
            Err(VerificationError::SignatureMismatch)
        );

        signature[0] ^= 0x01;
        assert_eq!(
            verify(b"header.payload", &signature, AlgorithmType::RS256, &key),
            Err(VerificationError::SignatureMismatch)
        );
    }
}
