use bridge_security::crc32;
use zerocopy::byteorder::big_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, Unaligned};

use crate::error::LinkError;

pub const PROTOCOL_VERSION: u8 = 0x02;
pub const MAX_PAYLOAD: usize = 256;
pub const HEADER_LEN: usize = 5;
pub const CRC_LEN: usize = 4;
pub const MAX_RAW_FRAME: usize = HEADER_LEN + MAX_PAYLOAD + CRC_LEN;

/// On-wire frame header, exactly 5 bytes, big-endian multi-byte fields.
#[repr(C, packed)]
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, Unaligned, Debug)]
pub struct FrameHeader {
    pub version: u8,
    pub payload_length: U16,
    pub command_id: U16,
}

const _: () = assert!(core::mem::size_of::<FrameHeader>() == HEADER_LEN);

/// A parsed frame with an owned, fixed-capacity payload copy. Never
/// aliases the buffer it was parsed from.
pub struct Frame {
    pub command_id: u16,
    pub payload: heapless::Vec<u8, MAX_PAYLOAD>,
}

/// Builds a raw frame (pre-COBS) into `dst`: `version | payload_len_be |
/// command_id_be | payload | crc32_be`. Returns the number of bytes
/// written. Fails with `Overflow` if `payload` exceeds `MAX_PAYLOAD` or
/// `dst` is too small.
pub fn build(dst: &mut [u8], command_id: u16, payload: &[u8]) -> Result<usize, LinkError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(LinkError::Overflow);
    }
    let total = HEADER_LEN + payload.len() + CRC_LEN;
    if dst.len() < total {
        return Err(LinkError::Overflow);
    }

    let header = FrameHeader {
        version: PROTOCOL_VERSION,
        payload_length: U16::new(payload.len() as u16),
        command_id: U16::new(command_id),
    };
    dst[..HEADER_LEN].copy_from_slice(header.as_bytes());
    dst[HEADER_LEN..HEADER_LEN + payload.len()].copy_from_slice(payload);

    let crc = crc32(&dst[..HEADER_LEN + payload.len()]);
    let crc_be = U32::new(crc);
    dst[HEADER_LEN + payload.len()..total].copy_from_slice(crc_be.as_bytes());

    Ok(total)
}

/// Parses a raw frame (post-COBS decode). Copies the payload into the
/// returned `Frame` so the caller's buffer can be reused immediately.
pub fn parse(buf: &[u8]) -> Result<Frame, LinkError> {
    if buf.len() < HEADER_LEN + CRC_LEN {
        return Err(LinkError::Malformed);
    }

    let header = FrameHeader::ref_from_bytes(&buf[..HEADER_LEN]).map_err(|_| LinkError::Malformed)?;
    if header.version != PROTOCOL_VERSION {
        return Err(LinkError::Malformed);
    }

    let payload_length = header.payload_length.get() as usize;
    if payload_length > MAX_PAYLOAD {
        return Err(LinkError::Malformed);
    }
    if buf.len() != HEADER_LEN + payload_length + CRC_LEN {
        return Err(LinkError::Malformed);
    }

    let command_id = header.command_id.get();
    let payload_start = HEADER_LEN;
    let payload_end = payload_start + payload_length;

    let computed_crc = crc32(&buf[..payload_end]);
    let trailer = U32::ref_from_bytes(&buf[payload_end..payload_end + CRC_LEN])
        .map_err(|_| LinkError::Malformed)?;
    if trailer.get() != computed_crc {
        return Err(LinkError::CrcMismatch);
    }

    let mut payload = heapless::Vec::new();
    // length already checked against MAX_PAYLOAD above.
    payload
        .extend_from_slice(&buf[payload_start..payload_end])
        .map_err(|_| LinkError::Overflow)?;

    Ok(Frame { command_id, payload })
}
