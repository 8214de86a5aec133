use bitflags::bitflags;
use zerocopy::byteorder::big_endian::U32;
use zerocopy::IntoBytes;

bitflags! {
    /// Feature bits reported in a `GET_CAPABILITIES` response.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct FeatureBits: u32 {
        const WATCHDOG        = 1 << 0;
        const RLE_COMPRESSION = 1 << 1;
        const EEPROM          = 1 << 2;
        const DAC             = 1 << 3;
        const SECONDARY_UART  = 1 << 4;
        const I2C             = 1 << 5;
        const FPU             = 1 << 6;
        const LOGIC_3V3       = 1 << 7;
        const LARGE_BUFFER    = 1 << 8;
    }
}

/// Payload of a `GET_CAPABILITIES_RESP` frame:
/// `[protocol_version, arch_id, num_digital, num_analog,
/// feature_bits_be:4]`, 8 bytes total.
pub struct Capabilities {
    pub protocol_version: u8,
    pub arch_id: u8,
    pub num_digital: u8,
    pub num_analog: u8,
    pub feature_bits: FeatureBits,
}

pub const CAPABILITIES_PAYLOAD_LEN: usize = 8;

impl Capabilities {
    pub fn to_payload(&self) -> [u8; CAPABILITIES_PAYLOAD_LEN] {
        let mut out = [0u8; CAPABILITIES_PAYLOAD_LEN];
        out[0] = self.protocol_version;
        out[1] = self.arch_id;
        out[2] = self.num_digital;
        out[3] = self.num_analog;
        let bits = U32::new(self.feature_bits.bits());
        out[4..8].copy_from_slice(bits.as_bytes());
        out
    }
}
