//! LINE webhook signature verification.
//!
//! Every webhook body is signed with HMAC-SHA256 under the channel secret
//! and delivered base64-encoded in the `x-line-signature` header. An
//! invalid signature rejects the entire batch before any parsing.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Signature verification failures.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// The header is not valid base64.
    #[error("malformed signature header")]
    MalformedHeader,

    /// The signature does not match the body.
    #[error("invalid signature")]
    InvalidSignature,
}

/// Verifier for LINE webhook signatures.
pub struct LineSignatureVerifier {
    channel_secret: String,
}

impl LineSignatureVerifier {
    /// Creates a verifier with the given channel secret.
    pub fn new(channel_secret: impl Into<String>) -> Self {
        Self {
            channel_secret: channel_secret.into(),
        }
    }

    /// Verifies the signature header against the raw request body.
    ///
    /// # Verification Steps
    ///
    /// 1. Base64-decode the header value
    /// 2. Compute HMAC-SHA256 of the body under the channel secret
    /// 3. Compare digests using constant-time comparison
    ///
    /// # Errors
    ///
    /// - `MalformedHeader` - header is not base64
    /// - `InvalidSignature` - digests differ
    pub fn verify(&self, body: &[u8], signature_header: &str) -> Result<(), SignatureError> {
        let provided = BASE64
            .decode(signature_header.trim())
            .map_err(|_| SignatureError::MalformedHeader)?;

        let expected = self.compute_signature(body);

        if !constant_time_compare(&expected, &provided) {
            return Err(SignatureError::InvalidSignature);
        }
        Ok(())
    }

    /// Computes the HMAC-SHA256 digest of the body.
    fn compute_signature(&self, body: &[u8]) -> Vec<u8> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.channel_secret.as_bytes())
            .expect("HMAC accepts any key");
        mac.update(body);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Performs constant-time comparison of two byte slices.
///
/// This prevents timing attacks that could leak information about the
/// expected signature.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes a base64 signature for use in test fixtures.
#[cfg(test)]
pub fn compute_test_signature(secret: &str, body: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(body.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test_channel_secret_12345";

    #[test]
    fn valid_signature_passes() {
        let verifier = LineSignatureVerifier::new(TEST_SECRET);
        let body = r#"{"events":[]}"#;
        let signature = compute_test_signature(TEST_SECRET, body);

        assert!(verifier.verify(body.as_bytes(), &signature).is_ok());
    }

    #[test]
    fn wrong_secret_fails() {
        let verifier = LineSignatureVerifier::new("another_secret");
        let body = r#"{"events":[]}"#;
        let signature = compute_test_signature(TEST_SECRET, body);

        let result = verifier.verify(body.as_bytes(), &signature);
        assert!(matches!(result, Err(SignatureError::InvalidSignature)));
    }

    #[test]
    fn tampered_body_fails() {
        let verifier = LineSignatureVerifier::new(TEST_SECRET);
        let signature = compute_test_signature(TEST_SECRET, r#"{"events":[]}"#);

        let result = verifier.verify(br#"{"events":[{}]}"#, &signature);
        assert!(matches!(result, Err(SignatureError::InvalidSignature)));
    }

    #[test]
    fn non_base64_header_is_malformed() {
        let verifier = LineSignatureVerifier::new(TEST_SECRET);

        let result = verifier.verify(b"body", "not base64 at all!!!");
        assert!(matches!(result, Err(SignatureError::MalformedHeader)));
    }

    #[test]
    fn header_whitespace_is_trimmed() {
        let verifier = LineSignatureVerifier::new(TEST_SECRET);
        let body = "payload";
        let signature = format!(" {} ", compute_test_signature(TEST_SECRET, body));

        assert!(verifier.verify(body.as_bytes(), &signature).is_ok());
    }

    #[test]
    fn constant_time_compare_handles_length_mismatch() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2]));
        assert!(constant_time_compare(&[1, 2, 3], &[1, 2, 3]));
    }
}
