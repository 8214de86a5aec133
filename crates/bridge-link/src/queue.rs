use bridge_common::util::RingBuffer;
use bridge_proto::MAX_RAW_FRAME;

/// A raw (pre-COBS) frame waiting to be sent.
#[derive(Clone, Copy)]
pub struct PendingFrame {
    pub command_id: u16,
    pub critical: bool,
    len: usize,
    raw: [u8; MAX_RAW_FRAME],
}

impl PendingFrame {
    pub fn new(command_id: u16, critical: bool, raw: &[u8]) -> Self {
        let mut buf = [0u8; MAX_RAW_FRAME];
        buf[..raw.len()].copy_from_slice(raw);
        PendingFrame {
            command_id,
            critical,
            len: raw.len(),
            raw: buf,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.raw[..self.len]
    }
}

impl Default for PendingFrame {
    fn default() -> Self {
        PendingFrame {
            command_id: 0,
            critical: false,
            len: 0,
            raw: [0u8; MAX_RAW_FRAME],
        }
    }
}

/// Bounded FIFO of outgoing frames awaiting their turn on the bus.
/// Non-critical frames (responses, status codes, flow control) pass
/// through here too, so transmission stays strictly in send order even
/// though only critical frames need an ACK afterward.
pub struct OutgoingQueue<const N: usize> {
    queue: RingBuffer<PendingFrame, N>,
}

impl<const N: usize> OutgoingQueue<N> {
    pub const fn new() -> Self {
        OutgoingQueue {
            queue: RingBuffer::new(),
        }
    }

    pub fn push(&mut self, frame: PendingFrame) -> Result<(), bridge_proto::LinkError> {
        if self.queue.is_full() {
            return Err(bridge_proto::LinkError::QueueFull);
        }
        self.queue.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<PendingFrame> {
        self.queue.poll_first()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// The single critical frame currently awaiting its ACK. The link
/// never has more than one of these outstanding at a time — a second
/// critical send waits in the `OutgoingQueue` until this one resolves.
pub struct InFlight {
    frame: PendingFrame,
    retries_remaining: u8,
}

impl InFlight {
    pub fn new(frame: PendingFrame, retry_limit: u8) -> Self {
        InFlight {
            frame,
            retries_remaining: retry_limit,
        }
    }

    pub fn frame(&self) -> &PendingFrame {
        &self.frame
    }

    /// Consumes one retry for an ACK-timeout retransmit. Returns
    /// `false` once retries are exhausted, in which case the caller
    /// should fault the frame rather than resend it again.
    pub fn retry_on_timeout(&mut self) -> bool {
        if self.retries_remaining == 0 {
            return false;
        }
        self.retries_remaining -= 1;
        true
    }

    /// A malformed/CRC-mismatched reply from the peer triggers an
    /// immediate retransmit of the cached frame, but — unlike a
    /// timeout — does not consume a retry slot: the peer is still
    /// responsive, it just received (or sent) a corrupted frame, so
    /// this is not evidence the link itself is failing.
    pub fn retransmit_raw(&self) -> &[u8] {
        self.frame.bytes()
    }

    pub fn retries_remaining(&self) -> u8 {
        self.retries_remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.retries_remaining == 0
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn fifo_order_preserved() {
        let mut q = OutgoingQueue::<4>::new();
        q.push(PendingFrame::new(0x20, true, &[1, 2, 3])).unwrap();
        q.push(PendingFrame::new(0x21, true, &[4, 5])).unwrap();
        assert_eq!(q.pop().unwrap().command_id, 0x20);
        assert_eq!(q.pop().unwrap().command_id, 0x21);
        assert!(q.pop().is_none());
    }

    #[test]
    fn push_past_capacity_fails() {
        let mut q = OutgoingQueue::<2>::new();
        q.push(PendingFrame::new(1, true, &[1])).unwrap();
        q.push(PendingFrame::new(2, true, &[1])).unwrap();
        assert_eq!(
            q.push(PendingFrame::new(3, true, &[1])),
            Err(bridge_proto::LinkError::QueueFull)
        );
    }

    #[test]
    fn timeout_retransmit_consumes_a_retry() {
        let frame = PendingFrame::new(0x20, true, &[1, 2, 3]);
        let mut in_flight = InFlight::new(frame, 3);
        assert!(in_flight.retry_on_timeout());
        assert_eq!(in_flight.retries_remaining(), 2);
        assert!(in_flight.retry_on_timeout());
        assert!(in_flight.retry_on_timeout());
        assert!(in_flight.is_exhausted());
        assert!(!in_flight.retry_on_timeout());
    }

    #[test]
    fn malformed_retransmit_does_not_consume_a_retry() {
        let frame = PendingFrame::new(0x20, true, &[1, 2, 3]);
        let in_flight = InFlight::new(frame, 3);
        let _ = in_flight.retransmit_raw();
        let _ = in_flight.retransmit_raw();
        assert_eq!(in_flight.retries_remaining(), 3);
    }
}
