use bridge_common::time::Instant;
use bridge_common::util::RingBuffer;

/// One previously-accepted frame, remembered long enough to recognize a
/// retransmit of it as a duplicate rather than a new frame.
#[derive(Clone, Copy, Default)]
struct DedupRecord {
    crc: u32,
    received_at_nanos: u64,
}

/// Remembers the CRCs of recently accepted frames so a sender's
/// retransmit of an already-ACKed frame (the ACK itself was lost) is
/// recognized and re-ACKed without being processed twice, instead of
/// being handed to the application a second time.
///
/// `N` bounds memory; an entry older than `window_ms` (the retry
/// window, see [`bridge_proto::timing::TimingConfig::retry_window_ms`])
/// is treated as expired even if still physically present, so a CRC
/// that happens to recur long after the original frame was accepted is
/// not mistaken for a live duplicate.
pub struct Dedup<const N: usize> {
    records: RingBuffer<DedupRecord, N>,
}

impl<const N: usize> Dedup<N> {
    pub const fn new() -> Self {
        Dedup {
            records: RingBuffer::new(),
        }
    }

    /// Returns `true` if `crc` was accepted within `window_ms` of `now`.
    /// Does not record `crc` — call [`Dedup::record`] once the frame is
    /// otherwise accepted.
    pub fn is_duplicate(&self, crc: u32, now: Instant, window_ms: u32) -> bool {
        let window_nanos = window_ms as u64 * 1_000_000;
        let mut snapshot = [DedupRecord::default(); N];
        let count = self.records.read(&mut snapshot);

        snapshot[..count].iter().any(|record| {
            record.crc == crc
                && now.nanos().wrapping_sub(record.received_at_nanos) <= window_nanos
        })
    }

    pub fn record(&mut self, crc: u32, now: Instant) {
        self.records.push(DedupRecord {
            crc,
            received_at_nanos: now.nanos(),
        });
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn fresh_crc_is_not_a_duplicate() {
        let dedup = Dedup::<4>::new();
        assert!(!dedup.is_duplicate(0xDEADBEEF, Instant::new(0), 1000));
    }

    #[test]
    fn recorded_crc_is_a_duplicate_within_window() {
        let mut dedup = Dedup::<4>::new();
        dedup.record(0x1234, Instant::new(0));
        assert!(dedup.is_duplicate(0x1234, Instant::new(500 * 1_000_000), 1000));
    }

    #[test]
    fn recorded_crc_expires_outside_window() {
        let mut dedup = Dedup::<4>::new();
        dedup.record(0x1234, Instant::new(0));
        assert!(!dedup.is_duplicate(0x1234, Instant::new(2_000 * 1_000_000), 1000));
    }

    #[test]
    fn distinct_crc_is_not_a_duplicate_even_when_recorded() {
        let mut dedup = Dedup::<4>::new();
        dedup.record(0x1234, Instant::new(0));
        assert!(!dedup.is_duplicate(0x5678, Instant::new(0), 1000));
    }

    #[test]
    fn oldest_record_is_evicted_past_capacity() {
        let mut dedup = Dedup::<2>::new();
        dedup.record(1, Instant::new(0));
        dedup.record(2, Instant::new(0));
        dedup.record(3, Instant::new(0));
        assert!(!dedup.is_duplicate(1, Instant::new(0), 1000));
        assert!(dedup.is_duplicate(2, Instant::new(0), 1000));
        assert!(dedup.is_duplicate(3, Instant::new(0), 1000));
    }
}
