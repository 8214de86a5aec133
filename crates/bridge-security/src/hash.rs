use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// HMAC-SHA-256(key, data). Accepts keys of any length, matching the
/// link's shared-secret bound (<= 32 bytes).
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac =
        HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Handshake tag: HMAC-SHA-256(secret, nonce) truncated to 16 bytes.
pub fn handshake_tag(secret: &[u8], nonce: &[u8]) -> [u8; 16] {
    let full = hmac_sha256(secret, nonce);
    let mut tag = [0u8; 16];
    tag.copy_from_slice(&full[..16]);
    tag
}
