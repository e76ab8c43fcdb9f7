//! Shared helpers for building certificate tokens at test time
#![allow(dead_code)]

use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaKeyPair};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Token signed with OpenSSL by the issuer key, `{"alg":"ES256"}`
pub const FIXTURE_TOKEN: &str = include_str!("../fixtures/oblivion_es256.jwt");

/// Private counterpart of the embedded trusted key
pub const ISSUER_SIGNING_KEY_PEM: &str = include_str!("../fixtures/issuer_signing_key.pem");

pub fn fixture_token() -> &'static str {
    FIXTURE_TOKEN.trim()
}

pub fn encode(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

pub fn decode_segment(segment: &str) -> Vec<u8> {
    URL_SAFE_NO_PAD.decode(segment).unwrap()
}

pub fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

pub fn issuer_key_pair() -> EcdsaKeyPair {
    let (_, pkcs8) = der::pem::decode_vec(ISSUER_SIGNING_KEY_PEM.as_bytes()).unwrap();
    EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &pkcs8).unwrap()
}

/// Sign `header.payload` with the issuer key, JSON taken verbatim
pub fn sign_es256(header: &str, payload: &str) -> String {
    let signing_input = format!("{}.{}", encode(header), encode(payload));
    let signature = issuer_key_pair()
        .sign(&SystemRandom::new(), signing_input.as_bytes())
        .unwrap();
    format!("{signing_input}.{}", encode(signature.as_ref()))
}

/// Sign a payload with the default `{"alg":"ES256","typ":"JWT"}` header
pub fn sign_payload(payload: &str) -> String {
    sign_es256(r#"{"alg":"ES256","typ":"JWT"}"#, payload)
}

/// Replace the payload segment, keeping header and signature
pub fn swap_payload(token: &str, payload: &str) -> String {
    let parts: Vec<&str> = token.split('.').collect();
    format!("{}.{}.{}", parts[0], encode(payload), parts[2])
}

/// Build an unsigned token with an arbitrary signature segment
pub fn unsigned(header: &str, payload: &str, signature: &str) -> String {
    format!("{}.{}.{signature}", encode(header), encode(payload))
}
