//! Owns the raw serial byte stream: COBS framing on the wire, receive
//! accumulation, and software flow control based on receive-buffer
//! watermarks. Retransmission bookkeeping (the cached last frame, retry
//! counting) lives one layer up in [`crate::queue::InFlight`] — this
//! module only ever sees bytes in and bytes out.

use bridge_common::bus::{BusPollError, BusRead, BusTransferError, BusWrite};
use bridge_common::util::RingBuffer;
use bridge_proto::{cobs, LinkError, MAX_RAW_FRAME};

/// Flow-control signal the transport wants the caller to send, derived
/// from how full the receive buffer is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowControl {
    None,
    SendXoff,
    SendXon,
}

/// `RX_CAP` is the receive accumulation buffer's capacity in bytes
/// (`HW_RX_BUFFER_SIZE` in the reference configuration). `high_water`/
/// `low_water` are absolute fill-level thresholds for XOFF/XON.
pub struct Transport<const RX_CAP: usize> {
    rx: RingBuffer<u8, RX_CAP>,
    high_water: usize,
    low_water: usize,
    xoff_sent: bool,
}

impl<const RX_CAP: usize> Transport<RX_CAP> {
    pub const fn new(high_water: usize, low_water: usize) -> Self {
        Transport {
            rx: RingBuffer::new(),
            high_water,
            low_water,
            xoff_sent: false,
        }
    }

    /// COBS-encodes `raw_frame` and writes it, terminator included, to
    /// the bus in one transfer.
    pub fn write_frame<B: BusWrite>(&self, bus: &mut B, raw_frame: &[u8]) -> Result<(), LinkError> {
        let mut encoded = [0u8; cobs::max_encoded_len(MAX_RAW_FRAME) + 1];
        let len = cobs::encode(raw_frame, &mut encoded).ok_or(LinkError::Overflow)?;
        encoded[len] = 0x00;
        bus.transfer(&encoded[..len + 1]).map_err(|e| match e {
            BusTransferError::WouldBlock => LinkError::WouldBlock,
        })
    }

    /// Pulls whatever bytes the bus has ready into the accumulation
    /// buffer. Returns the flow-control action the caller should take,
    /// if any, based on the buffer's fill level after this poll.
    pub fn poll_bus<B: BusRead>(&mut self, bus: &B) -> Result<FlowControl, LinkError> {
        let mut scratch = [0u8; 32];
        loop {
            match bus.poll_next(&mut scratch) {
                Ok(0) => break,
                Ok(n) => {
                    self.rx.write(&scratch[..n as usize]);
                }
                Err(BusPollError::WouldBlock) => break,
                Err(BusPollError::BufferOverflow) => return Err(LinkError::Overflow),
            }
        }
        Ok(self.flow_control_action())
    }

    fn flow_control_action(&mut self) -> FlowControl {
        let fill = self.rx.len();
        if !self.xoff_sent && fill >= self.high_water {
            self.xoff_sent = true;
            FlowControl::SendXoff
        } else if self.xoff_sent && fill <= self.low_water {
            self.xoff_sent = false;
            FlowControl::SendXon
        } else {
            FlowControl::None
        }
    }

    /// Extracts the next complete COBS packet (terminator consumed,
    /// not included in the decode) from the accumulation buffer and
    /// decodes it into `out`. Returns `Ok(None)` if no full packet is
    /// buffered yet. A decode failure drops the malformed packet and
    /// returns `Err(LinkError::Malformed)` rather than desyncing the
    /// stream — the next `0x00` still marks the next packet boundary.
    pub fn next_frame(&mut self, out: &mut [u8]) -> Result<Option<usize>, LinkError> {
        let Some(packet_len) = self.find_terminator() else {
            return Ok(None);
        };

        let mut encoded = [0u8; MAX_RAW_FRAME + MAX_RAW_FRAME / 254 + 1];
        let copied = self.rx.read(&mut encoded[..packet_len]);
        debug_assert_eq!(copied, packet_len);
        self.rx.drop_first(packet_len + 1); // +1 consumes the terminator

        match cobs::decode(&encoded[..packet_len], out) {
            Some(n) => Ok(Some(n)),
            None => Err(LinkError::Malformed),
        }
    }

    fn find_terminator(&self) -> Option<usize> {
        let fill = self.rx.len();
        let mut scan = [0u8; RX_CAP];
        let n = self.rx.read(&mut scan[..fill]);
        scan[..n].iter().position(|&b| b == 0)
    }
}
