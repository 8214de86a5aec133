//! Pre-shared-secret handshake: `LINK_SYNC` / `LINK_SYNC_RESP` payload
//! construction and verification. Nonce generation is the caller's
//! responsibility — a no_std target has no canonical source of
//! randomness, so this module only ever consumes a nonce it is given.

use bridge_security::{constant_time_eq, handshake_tag};

pub const NONCE_LENGTH: usize = 16;
pub const TAG_LENGTH: usize = 16;
pub const SYNC_RESP_LEN: usize = NONCE_LENGTH + TAG_LENGTH;

/// Builds the `LINK_SYNC` payload: the nonce, verbatim.
pub fn sync_payload(nonce: &[u8; NONCE_LENGTH]) -> [u8; NONCE_LENGTH] {
    *nonce
}

/// Endpoint side: builds the `LINK_SYNC_RESP` payload for a received
/// nonce. Returns `nonce || tag` when `secret` is configured, or just
/// `nonce` when it isn't — the host decides whether an unauthenticated
/// endpoint is acceptable.
pub fn sync_resp_payload(
    secret: Option<&[u8]>,
    nonce: &[u8; NONCE_LENGTH],
    out: &mut [u8; SYNC_RESP_LEN],
) -> usize {
    out[..NONCE_LENGTH].copy_from_slice(nonce);
    match secret {
        Some(secret) => {
            let tag = handshake_tag(secret, nonce);
            out[NONCE_LENGTH..].copy_from_slice(&tag);
            SYNC_RESP_LEN
        }
        None => NONCE_LENGTH,
    }
}

/// Host side: verifies a `LINK_SYNC_RESP` payload against the nonce
/// that was sent and the shared secret. An endpoint that replied with
/// the bare nonce (no secret configured) only verifies if the host also
/// has no secret to check against.
pub fn verify_sync_resp(secret: Option<&[u8]>, nonce: &[u8; NONCE_LENGTH], resp: &[u8]) -> bool {
    match secret {
        None => resp.len() == NONCE_LENGTH && constant_time_eq(&resp[..NONCE_LENGTH], nonce),
        Some(secret) => {
            if resp.len() != SYNC_RESP_LEN {
                return false;
            }
            if !constant_time_eq(&resp[..NONCE_LENGTH], nonce) {
                return false;
            }
            let expected = handshake_tag(secret, nonce);
            constant_time_eq(&resp[NONCE_LENGTH..], &expected)
        }
    }
}
