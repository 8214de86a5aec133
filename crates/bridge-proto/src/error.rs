use core::fmt;

/// Unified error type for every fallible operation in the link stack.
/// Variants with a status-frame counterpart map 1:1 onto
/// [`crate::command`]'s status codes; the rest are internal-only and
/// never cross the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// Frame structurally invalid: short buffer, bad version, or a
    /// declared payload length inconsistent with the buffer.
    Malformed,
    /// Trailer CRC did not match the computed CRC.
    CrcMismatch,
    /// RX buffer or payload exceeded a fixed bound.
    Overflow,
    /// Command id outside the recognized set.
    CmdUnknown,
    /// Command recognized but unsupported on this target.
    NotImplemented,
    /// ACK retries exhausted.
    Timeout,
    /// Power-on cryptographic self-test failed; the link is in the
    /// terminal Fault state.
    CryptoFault,
    /// Outgoing queue has no free slot.
    QueueFull,
    /// Underlying bus would block on this operation.
    WouldBlock,
    /// Underlying bus transfer failed.
    BusTransfer,
    /// A send was rejected because the link is Unsynchronized and the
    /// command is not part of the handshake/system-query allowlist.
    NotSynchronized,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinkError::Malformed => "malformed frame",
            LinkError::CrcMismatch => "CRC mismatch",
            LinkError::Overflow => "buffer overflow",
            LinkError::CmdUnknown => "unknown command id",
            LinkError::NotImplemented => "command not implemented on this target",
            LinkError::Timeout => "ack timeout",
            LinkError::CryptoFault => "cryptographic self-test failed",
            LinkError::QueueFull => "outgoing queue full",
            LinkError::WouldBlock => "operation would block",
            LinkError::BusTransfer => "bus transfer failed",
            LinkError::NotSynchronized => "link is not synchronized",
        };
        f.write_str(s)
    }
}

impl core::error::Error for LinkError {}

pub type Result<T> = core::result::Result<T, LinkError>;
