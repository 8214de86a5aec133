//! Remote process control. `RUN`/`RUN_ASYNC` start a process on the
//! peer; `POLL`/`KILL` address an already-running one by PID.
//! `PROCESS_POLL_RESP` pairs with the oldest pending poll, FIFO,
//! bounded by `MAX_PENDING_PROCESS_POLLS`.

use bridge_common::util::RingBuffer;
use bridge_link::Sender;
use bridge_proto::command::{CMD_PROCESS_KILL, CMD_PROCESS_POLL, CMD_PROCESS_RUN, CMD_PROCESS_RUN_ASYNC};
use bridge_proto::LinkError;

pub type Pid = u16;

/// `PENDING` bounds how many outstanding polls this service tracks
/// (`MAX_PENDING_PROCESS_POLLS` in the reference configuration).
pub struct Process<const PENDING: usize> {
    pending_polls: RingBuffer<Pid, PENDING>,
}

impl<const PENDING: usize> Process<PENDING> {
    pub const fn new() -> Self {
        Process { pending_polls: RingBuffer::new() }
    }

    pub fn run(&self, sender: &mut impl Sender, command_line: &[u8]) -> Result<(), LinkError> {
        sender.send(CMD_PROCESS_RUN, command_line)
    }

    pub fn run_async(&self, sender: &mut impl Sender, command_line: &[u8]) -> Result<(), LinkError> {
        sender.send(CMD_PROCESS_RUN_ASYNC, command_line)
    }

    pub fn kill(&self, sender: &mut impl Sender, pid: Pid) -> Result<(), LinkError> {
        sender.send(CMD_PROCESS_KILL, &pid.to_be_bytes())
    }

    pub fn poll(&mut self, sender: &mut impl Sender, pid: Pid) -> Result<(), LinkError> {
        if self.pending_polls.is_full() {
            return Err(LinkError::QueueFull);
        }
        sender.send(CMD_PROCESS_POLL, &pid.to_be_bytes())?;
        self.pending_polls.push(pid);
        Ok(())
    }

    /// Pairs a `PROCESS_POLL_RESP` payload (the peer's raw exit-status
    /// bytes) with the oldest pending PID.
    pub fn on_poll_response<'a>(&mut self, payload: &'a [u8]) -> Option<(Pid, &'a [u8])> {
        let pid = self.pending_polls.poll_first()?;
        Some((pid, payload))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    struct NullSender;
    impl Sender for NullSender {
        fn send(&mut self, _command_id: u16, _payload: &[u8]) -> Result<(), LinkError> {
            Ok(())
        }
    }

    #[test]
    fn poll_response_pairs_fifo() {
        let mut process = Process::<2>::new();
        let mut sender = NullSender;
        process.poll(&mut sender, 10).unwrap();
        process.poll(&mut sender, 20).unwrap();

        let (pid, _) = process.on_poll_response(&[0]).unwrap();
        assert_eq!(pid, 10);
        let (pid, _) = process.on_poll_response(&[0]).unwrap();
        assert_eq!(pid, 20);
        assert!(process.on_poll_response(&[0]).is_none());
    }
}
