use crc::{Crc, Table};

/// CRC-32 IEEE 802.3 (== CRC-32/ISO-HDLC): poly 0xEDB88320 reflected,
/// init 0xFFFFFFFF, final xor 0xFFFFFFFF. Covers frame header + payload.
const FRAME_CRC: Crc<u32, Table<1>> = Crc::<u32, Table<1>>::new(&crc::CRC_32_ISO_HDLC);

pub fn crc32(data: &[u8]) -> u32 {
    FRAME_CRC.checksum(data)
}
