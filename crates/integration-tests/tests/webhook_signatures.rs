//! Webhook signature verification against independently computed vectors.

use funnelkit_admin::routes::webhooks::verify_webhook_signature;

// HMAC-SHA256 of b"{}" under key b"secret-key", base64 encoded. Computed
// with `openssl dgst -sha256 -hmac` to keep the vector independent of the
// hmac crate.
const EMPTY_OBJECT_SIGNATURE: &str = "mZIqDbsf6VYkyTxyBERcLv+KAUsMm1hd3y2gwhCDo04=";

#[test]
fn known_vector_verifies() {
    assert!(verify_webhook_signature(
        "secret-key",
        b"{}",
        EMPTY_OBJECT_SIGNATURE
    ));
}

#[test]
fn different_body_rejected() {
    assert!(!verify_webhook_signature(
        "secret-key",
        b"{\"id\":1}",
        EMPTY_OBJECT_SIGNATURE
    ));
}

#[test]
fn different_secret_rejected() {
    assert!(!verify_webhook_signature(
        "another-key",
        b"{}",
        EMPTY_OBJECT_SIGNATURE
    ));
}

#[test]
fn empty_signature_rejected() {
    assert!(!verify_webhook_signature("secret-key", b"{}", ""));
}

#[test]
fn truncated_signature_rejected() {
    // Valid base64, wrong length for SHA-256 output.
    assert!(!verify_webhook_signature("secret-key", b"{}", "AAAA"));
}
