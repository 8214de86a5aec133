#![cfg_attr(not(test), no_std)]

//! Security primitives used by the link: frame CRC, the handshake's
//! HMAC-SHA-256 tag, constant-time comparison, secret wiping, and the
//! power-on cryptographic self-test.

mod constant_time;
mod crc32;
mod hash;
mod self_test;
mod wipe;

pub use constant_time::constant_time_eq;
pub use crc32::crc32;
pub use hash::{handshake_tag, hmac_sha256, sha256};
pub use self_test::{run_self_test, SelfTestError};
pub use wipe::secure_wipe;
