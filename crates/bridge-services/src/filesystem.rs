//! Filesystem client. `FS_WRITE`/`FS_REMOVE` are fire-and-forget beyond
//! the link's own ACK; `FS_READ` enqueues the path it asked for so the
//! matching `FS_READ_RESP` chunk can be handed back to the right
//! caller. Cross-frame reassembly of a file larger than one payload is
//! the caller's job — this crate only ever sees one chunk at a time.

use bridge_common::util::RingBuffer;
use bridge_link::Sender;
use bridge_proto::command::{CMD_FS_READ, CMD_FS_REMOVE, CMD_FS_WRITE};
use bridge_proto::LinkError;

pub const MAX_PATH_LEN: usize = 64;

type Path = heapless::Vec<u8, MAX_PATH_LEN>;

/// `PENDING` bounds how many outstanding reads this service tracks.
pub struct Filesystem<const PENDING: usize> {
    pending_reads: RingBuffer<Path, PENDING>,
}

impl<const PENDING: usize> Filesystem<PENDING> {
    pub const fn new() -> Self {
        Filesystem { pending_reads: RingBuffer::new() }
    }

    fn path_prefixed_payload(path: &[u8]) -> Result<heapless::Vec<u8, { MAX_PATH_LEN + 1 }>, LinkError> {
        if path.len() > u8::MAX as usize || path.len() > MAX_PATH_LEN {
            return Err(LinkError::Overflow);
        }
        let mut out = heapless::Vec::new();
        out.push(path.len() as u8).map_err(|_| LinkError::Overflow)?;
        out.extend_from_slice(path).map_err(|_| LinkError::Overflow)?;
        Ok(out)
    }

    pub fn write(&self, sender: &mut impl Sender, path: &[u8], data: &[u8]) -> Result<(), LinkError> {
        let prefix = Self::path_prefixed_payload(path)?;
        let mut payload = heapless::Vec::<u8, { MAX_PATH_LEN + 1 + 256 }>::new();
        payload.extend_from_slice(&prefix).map_err(|_| LinkError::Overflow)?;
        payload.extend_from_slice(data).map_err(|_| LinkError::Overflow)?;
        sender.send(CMD_FS_WRITE, &payload)
    }

    pub fn remove(&self, sender: &mut impl Sender, path: &[u8]) -> Result<(), LinkError> {
        let payload = Self::path_prefixed_payload(path)?;
        sender.send(CMD_FS_REMOVE, &payload)
    }

    pub fn read(&mut self, sender: &mut impl Sender, path: &[u8]) -> Result<(), LinkError> {
        if self.pending_reads.is_full() {
            return Err(LinkError::QueueFull);
        }
        let payload = Self::path_prefixed_payload(path)?;
        sender.send(CMD_FS_READ, &payload)?;
        let owned: Path = heapless::Vec::from_slice(path).map_err(|_| LinkError::Overflow)?;
        self.pending_reads.push(owned);
        Ok(())
    }

    /// Pairs an `FS_READ_RESP` chunk with the oldest pending path.
    pub fn on_read_response<'a>(&mut self, chunk: &'a [u8]) -> Option<(Path, &'a [u8])> {
        let path = self.pending_reads.poll_first()?;
        Some((path, chunk))
    }
}
