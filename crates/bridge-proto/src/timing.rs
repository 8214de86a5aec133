use zerocopy::byteorder::big_endian::{U16, U32};
use zerocopy::IntoBytes;

pub const ACK_TIMEOUT_MIN_MS: u16 = 25;
pub const ACK_TIMEOUT_MAX_MS: u16 = 60_000;
pub const RETRY_LIMIT_MIN: u8 = 1;
pub const RETRY_LIMIT_MAX: u8 = 8;
pub const RESPONSE_TIMEOUT_MIN_MS: u32 = 100;
pub const RESPONSE_TIMEOUT_MAX_MS: u32 = 180_000;

pub const TIMING_CONFIG_PAYLOAD_LEN: usize = 7;

/// Reliability timing, carried (optionally) in a `LINK_RESET` payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub ack_timeout_ms: u16,
    pub retry_limit: u8,
    pub response_timeout_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            ack_timeout_ms: 200,
            retry_limit: 3,
            response_timeout_ms: 2_000,
        }
    }
}

impl TimingConfig {
    /// Retry window: the interval during which a repeat CRC on receive
    /// is treated as a duplicate.
    pub fn retry_window_ms(&self) -> u32 {
        self.ack_timeout_ms as u32 * (self.retry_limit as u32 + 1)
    }

    /// Parses a 7-byte `LINK_RESET` timing payload, clamping any
    /// out-of-range field to the default rather than rejecting the
    /// frame.
    pub fn from_payload(payload: &[u8; TIMING_CONFIG_PAYLOAD_LEN]) -> TimingConfig {
        let ack_timeout_ms = u16::from_be_bytes([payload[0], payload[1]]);
        let retry_limit = payload[2];
        let response_timeout_ms =
            u32::from_be_bytes([payload[3], payload[4], payload[5], payload[6]]);

        let defaults = TimingConfig::default();
        TimingConfig {
            ack_timeout_ms: if (ACK_TIMEOUT_MIN_MS..=ACK_TIMEOUT_MAX_MS).contains(&ack_timeout_ms)
            {
                ack_timeout_ms
            } else {
                defaults.ack_timeout_ms
            },
            retry_limit: if (RETRY_LIMIT_MIN..=RETRY_LIMIT_MAX).contains(&retry_limit) {
                retry_limit
            } else {
                defaults.retry_limit
            },
            response_timeout_ms: if (RESPONSE_TIMEOUT_MIN_MS..=RESPONSE_TIMEOUT_MAX_MS)
                .contains(&response_timeout_ms)
            {
                response_timeout_ms
            } else {
                defaults.response_timeout_ms
            },
        }
    }

    pub fn to_payload(&self) -> [u8; TIMING_CONFIG_PAYLOAD_LEN] {
        let mut out = [0u8; TIMING_CONFIG_PAYLOAD_LEN];
        out[0..2].copy_from_slice(U16::new(self.ack_timeout_ms).as_bytes());
        out[2] = self.retry_limit;
        out[3..7].copy_from_slice(U32::new(self.response_timeout_ms).as_bytes());
        out
    }
}
