//! Callback signature verification
//!
//! The gateway signs `"{order_id}|{payment_id}"` with HMAC-SHA256 and
//! sends the tag hex-encoded. Verification is constant-time via `ring`.

use ring::hmac;

/// Hex HMAC-SHA256 tag over the order/payment pair. Test helpers use this
/// to forge valid callbacks; production only ever verifies.
pub fn expected_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let tag = hmac::sign(&key, format!("{order_id}|{payment_id}").as_bytes());
    hex::encode(tag.as_ref())
}

/// Constant-time check of a supplied hex signature.
pub fn verify(secret: &str, order_id: &str, payment_id: &str, supplied: &str) -> bool {
    let Ok(supplied_tag) = hex::decode(supplied) else {
        return false;
    };
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    hmac::verify(
        &key,
        format!("{order_id}|{payment_id}").as_bytes(),
        &supplied_tag,
    )
    .is_ok()
}
