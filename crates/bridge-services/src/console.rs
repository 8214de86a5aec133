//! Console output: bytes are buffered locally and drained into
//! `CONSOLE_WRITE` frames opportunistically. There is no per-write
//! correlation — a `STATUS_ACK` from the link confirms delivery, but
//! the caller doesn't need to match it to a particular `write` call.

use bridge_link::Sender;
use bridge_proto::command::CMD_CONSOLE_WRITE;
use bridge_proto::{LinkError, MAX_PAYLOAD};

/// `N` bounds how many unflushed bytes this service holds locally.
pub struct Console<const N: usize> {
    buf: heapless::Vec<u8, N>,
}

impl<const N: usize> Console<N> {
    pub const fn new() -> Self {
        Console { buf: heapless::Vec::new() }
    }

    /// Appends `bytes` to the local buffer. Returns `Overflow` if the
    /// buffer doesn't have room; the caller should `flush` first.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.buf.extend_from_slice(bytes).map_err(|_| LinkError::Overflow)
    }

    /// Sends as many `CONSOLE_WRITE` frames as needed to drain the
    /// local buffer, each carrying up to `MAX_PAYLOAD` bytes.
    pub fn flush(&mut self, sender: &mut impl Sender) -> Result<(), LinkError> {
        while !self.buf.is_empty() {
            let chunk_len = self.buf.len().min(MAX_PAYLOAD);
            sender.send(CMD_CONSOLE_WRITE, &self.buf[..chunk_len])?;
            let remaining: heapless::Vec<u8, N> =
                heapless::Vec::from_slice(&self.buf[chunk_len..]).map_err(|_| LinkError::Overflow)?;
            self.buf = remaining;
        }
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    struct RecordingSender {
        sent: Vec<(u16, std::vec::Vec<u8>)>,
    }
    impl Sender for RecordingSender {
        fn send(&mut self, command_id: u16, payload: &[u8]) -> Result<(), LinkError> {
            self.sent.push((command_id, payload.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn flush_sends_one_frame_for_a_short_write() {
        let mut console = Console::<256>::new();
        console.write(b"hello").unwrap();
        let mut sender = RecordingSender { sent: Vec::new() };
        console.flush(&mut sender).unwrap();
        assert_eq!(sender.sent, std::vec![(CMD_CONSOLE_WRITE, b"hello".to_vec())]);
        assert_eq!(console.pending(), 0);
    }

    #[test]
    fn flush_chunks_writes_larger_than_max_payload() {
        let mut console = Console::<1024>::new();
        let data = [0x41u8; MAX_PAYLOAD + 10];
        console.write(&data).unwrap();
        let mut sender = RecordingSender { sent: Vec::new() };
        console.flush(&mut sender).unwrap();
        assert_eq!(sender.sent.len(), 2);
        assert_eq!(sender.sent[0].1.len(), MAX_PAYLOAD);
        assert_eq!(sender.sent[1].1.len(), 10);
    }
}
