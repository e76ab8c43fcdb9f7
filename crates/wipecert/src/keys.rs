//! The embedded trust anchor
//!
//! Exactly one public key is compiled into the verifier from
//! `keys/trusted_public_key.pem`. It is parsed on first use into a `static`
//! and never replaced. Rotating it means shipping a new build, so there is
//! no public constructor taking key material.
//!
//! The key is stored as DER SubjectPublicKeyInfo, the form `aws-lc-rs`
//! accepts for both RSA and ECDSA verification. The RustCrypto `spki` and
//! `der` crates are used to read the algorithm identifier so the key family
//! is known before any signature is checked.

use crate::error::KeyError;
use der::Decode;
use spki::{ObjectIdentifier, SubjectPublicKeyInfoRef};
use std::sync::LazyLock;

const EMBEDDED_PUBLIC_KEY_PEM: &str = include_str!("../keys/trusted_public_key.pem");

const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const SECP256R1_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const RSA_ENCRYPTION_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// SEC1 uncompressed P-256 point: 0x04 || X (32 bytes) || Y (32 bytes)
const P256_UNCOMPRESSED_POINT_LEN: usize = 65;

static EMBEDDED: LazyLock<Result<TrustedKey, KeyError>> =
    LazyLock::new(|| TrustedKey::from_pem(EMBEDDED_PUBLIC_KEY_PEM));

/// Algorithm family of a public key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    /// ECDSA over NIST P-256
    EcdsaP256,
    /// RSA (PKCS#1 v1.5 signatures)
    Rsa,
}

impl KeyFamily {
    pub const fn as_str(&self) -> &'static str {
        match self {
            KeyFamily::EcdsaP256 => "ECDSA P-256",
            KeyFamily::Rsa => "RSA",
        }
    }
}

impl std::fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A public key certificates are verified against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedKey {
    family: KeyFamily,
    spki_der: Box<[u8]>,
}

impl TrustedKey {
    /// The key compiled into this build
    pub fn embedded() -> Result<&'static TrustedKey, KeyError> {
        EMBEDDED.as_ref().map_err(Clone::clone)
    }

    /// Key family, which decides the algorithms it can verify
    pub fn family(&self) -> KeyFamily {
        self.family
    }

    /// DER-encoded SubjectPublicKeyInfo
    pub(crate) fn spki_der(&self) -> &[u8] {
        &self.spki_der
    }

    /// Parse a `PUBLIC KEY` PEM block
    pub(crate) fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let (label, der_bytes) =
            der::pem::decode_vec(pem.as_bytes()).map_err(|e| KeyError::Pem(e.to_string()))?;

        if label != "PUBLIC KEY" {
            return Err(KeyError::PemLabel(label.to_string()));
        }

        Self::from_spki_der(&der_bytes)
    }

    /// Parse DER SubjectPublicKeyInfo
    pub(crate) fn from_spki_der(der_bytes: &[u8]) -> Result<Self, KeyError> {
        let spki = SubjectPublicKeyInfoRef::from_der(der_bytes)
            .map_err(|e| KeyError::Spki(e.to_string()))?;

        let oid = spki.algorithm.oid;
        let family = if oid == EC_PUBLIC_KEY_OID {
            let curve = spki
                .algorithm
                .parameters_oid()
                .map_err(|e| KeyError::Spki(format!("missing curve parameters: {e}")))?;
            if curve != SECP256R1_OID {
                return Err(KeyError::UnsupportedCurve(curve.to_string()));
            }

            let point = spki.subject_public_key.raw_bytes();
            if point.len() != P256_UNCOMPRESSED_POINT_LEN || point[0] != 0x04 {
                return Err(KeyError::Malformed(
                    "P-256 key must be an uncompressed curve point",
                ));
            }
            KeyFamily::EcdsaP256
        } else if oid == RSA_ENCRYPTION_OID {
            if spki.subject_public_key.raw_bytes().is_empty() {
                return Err(KeyError::Malformed("RSA key has no modulus"));
            }
            KeyFamily::Rsa
        } else {
            return Err(KeyError::UnsupportedKeyType(oid.to_string()));
        };

        Ok(Self {
            family,
            spki_der: der_bytes.into(),
        })
    }
}
