use crate::constant_time::constant_time_eq;
use crate::hash::{hmac_sha256, sha256};

/// Power-on cryptographic self-test failure. Either variant means the
/// build is linked against a broken primitive; the caller should move
/// the link to the terminal fault state rather than retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfTestError {
    Sha256Mismatch,
    HmacSha256Mismatch,
}

const SHA256_KAT_MSG: &[u8] = b"abc";
const SHA256_KAT_EXPECTED: [u8; 32] = [
    0xBA, 0x78, 0x16, 0xBF, 0x8F, 0x01, 0xCF, 0xEA, 0x41, 0x41, 0x40, 0xDE, 0x5D, 0xAE, 0x22, 0x23,
    0xB0, 0x03, 0x61, 0xA3, 0x96, 0x17, 0x7A, 0x9C, 0xB4, 0x10, 0xFF, 0x61, 0xF2, 0x00, 0x15, 0xAD,
];

const HMAC_KAT_KEY: &[u8] = b"key";
const HMAC_KAT_DATA: &[u8] = b"The quick brown fox jumps over the lazy dog";
const HMAC_KAT_EXPECTED: [u8; 32] = [
    0xF7, 0xBC, 0x83, 0xF4, 0x30, 0x53, 0x84, 0x24, 0xB1, 0x32, 0x98, 0xE6, 0xAA, 0x6F, 0xB1, 0x43,
    0xEF, 0x4D, 0x59, 0xA1, 0x49, 0x46, 0x17, 0x59, 0x97, 0x47, 0x9D, 0xBC, 0x2D, 0x1A, 0x3C, 0xD8,
];

/// Runs both known-answer tests. Intended to be called once at startup,
/// before the link accepts any traffic.
pub fn run_self_test() -> Result<(), SelfTestError> {
    if !constant_time_eq(&sha256(SHA256_KAT_MSG), &SHA256_KAT_EXPECTED) {
        return Err(SelfTestError::Sha256Mismatch);
    }

    if !constant_time_eq(
        &hmac_sha256(HMAC_KAT_KEY, HMAC_KAT_DATA),
        &HMAC_KAT_EXPECTED,
    ) {
        return Err(SelfTestError::HmacSha256Mismatch);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn passes_on_correct_primitives() {
        assert_eq!(run_self_test(), Ok(()));
    }
}
