//! HMAC-SHA256 webhook signature signing and verification.
//!
//! Signatures are computed over the exact request bytes and carried as
//! `sha256=<hex>` in the delivery's signature header. Verification is a
//! pure predicate: no parsing, no I/O, constant-time comparison.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Algorithm tag prefixing every signature header value.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Computes the `sha256=`-prefixed hex HMAC tag for `body` under `secret`.
#[must_use]
pub fn sign(body: &[u8], secret: &[u8]) -> String {
    // HMAC accepts keys of any length, so construction cannot fail.
    let digest = HmacSha256::new_from_slice(secret).map(|mut mac| {
        mac.update(body);
        mac.finalize().into_bytes()
    });
    match digest {
        Ok(bytes) => format!("{SIGNATURE_PREFIX}{}", hex::encode(bytes)),
        Err(_) => String::new(),
    }
}

/// Whether `signature` is the valid HMAC tag for `body` under `secret`.
///
/// Returns `false` for a missing algorithm tag, non-hex payload, or
/// digest mismatch. Comparison of the digests is constant-time.
#[must_use]
pub fn verify(body: &[u8], signature: &str, secret: &[u8]) -> bool {
    let Some(hex_part) = signature.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    let Ok(claimed) = hex::decode(hex_part) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    let computed = mac.finalize().into_bytes();
    computed.as_slice().ct_eq(claimed.as_slice()).into()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_round_trips() {
        let body = br#"{"action":"closed"}"#;
        let tag = sign(body, b"secret");
        assert!(tag.starts_with(SIGNATURE_PREFIX));
        assert!(verify(body, &tag, b"secret"));
    }

    #[test]
    fn wrong_secret_fails() {
        let body = b"payload bytes";
        let tag = sign(body, b"secret");
        assert!(!verify(body, &tag, b"wrong-secret"));
    }

    #[test]
    fn tampered_body_fails() {
        let tag = sign(b"original", b"secret");
        assert!(!verify(b"tampered", &tag, b"secret"));
    }

    #[test]
    fn missing_prefix_fails() {
        let tag = sign(b"body", b"secret");
        let Some(bare) = tag.strip_prefix(SIGNATURE_PREFIX) else {
            panic!("tag must carry prefix");
        };
        assert!(!verify(b"body", bare, b"secret"));
    }

    #[test]
    fn non_hex_signature_fails() {
        assert!(!verify(b"body", "sha256=not-hex!", b"secret"));
    }

    #[test]
    fn truncated_signature_fails() {
        let tag = sign(b"body", b"secret");
        let truncated: String = tag.chars().take(tag.len() - 4).collect();
        assert!(!verify(b"body", &truncated, b"secret"));
    }

    #[test]
    fn signature_covers_exact_bytes_not_reserialized_json() {
        // Same JSON value, different wire bytes: the tags must differ.
        let compact = br#"{"a":1}"#;
        let spaced = br#"{ "a": 1 }"#;
        assert_ne!(sign(compact, b"s"), sign(spaced, b"s"));
    }
}
