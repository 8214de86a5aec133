//! Mailbox client: push outbound messages, request inbound ones, and
//! query how many are queued on the peer. `READ`/`AVAILABLE` carry no
//! correlation payload of their own, so this service only needs to
//! count how many of each are outstanding to reject an unmatched
//! response rather than silently misattributing it.

use bridge_link::Sender;
use bridge_proto::command::{
    CMD_MAILBOX_AVAILABLE, CMD_MAILBOX_PROCESSED, CMD_MAILBOX_PUSH, CMD_MAILBOX_READ,
};
use bridge_proto::LinkError;

pub struct Mailbox {
    pending_reads: u16,
    pending_availability_queries: u16,
}

impl Mailbox {
    pub const fn new() -> Self {
        Mailbox {
            pending_reads: 0,
            pending_availability_queries: 0,
        }
    }

    pub fn push(&self, sender: &mut impl Sender, message: &[u8]) -> Result<(), LinkError> {
        sender.send(CMD_MAILBOX_PUSH, message)
    }

    pub fn request_read(&mut self, sender: &mut impl Sender) -> Result<(), LinkError> {
        sender.send(CMD_MAILBOX_READ, &[])?;
        self.pending_reads += 1;
        Ok(())
    }

    pub fn request_available(&mut self, sender: &mut impl Sender) -> Result<(), LinkError> {
        sender.send(CMD_MAILBOX_AVAILABLE, &[])?;
        self.pending_availability_queries += 1;
        Ok(())
    }

    /// Acknowledges that a message this client already read has been
    /// fully processed, letting the peer reclaim its slot.
    pub fn mark_processed(&self, sender: &mut impl Sender) -> Result<(), LinkError> {
        sender.send(CMD_MAILBOX_PROCESSED, &[])
    }

    /// Parses a `MAILBOX_READ_RESP` payload (`[msg_len:u16_be][msg]`).
    /// Returns `None` if no read was outstanding.
    pub fn on_read_response<'a>(&mut self, payload: &'a [u8]) -> Option<&'a [u8]> {
        if self.pending_reads == 0 {
            return None;
        }
        let &[len_hi, len_lo, ref rest @ ..] = payload else {
            return None;
        };
        let len = u16::from_be_bytes([len_hi, len_lo]) as usize;
        let msg = rest.get(..len)?;
        self.pending_reads -= 1;
        Some(msg)
    }

    /// Parses a `MAILBOX_AVAILABLE_RESP` payload (`[count:u16_be]`).
    pub fn on_available_response(&mut self, payload: &[u8]) -> Option<u16> {
        if self.pending_availability_queries == 0 {
            return None;
        }
        let &[hi, lo] = payload else {
            return None;
        };
        self.pending_availability_queries -= 1;
        Some(u16::from_be_bytes([hi, lo]))
    }
}
