//! Identity the link reports back through `GET_VERSION` / `GET_FREE_MEMORY`
//! / `GET_CAPABILITIES`. Feature bits are passed through as a raw `u32`
//! rather than `bridge_proto::capabilities::FeatureBits` so this crate
//! doesn't have to depend on the protocol crate just to name them.

pub trait SystemInfo {
    fn firmware_version_major(&self) -> u8;
    fn firmware_version_minor(&self) -> u8;
    fn arch_id(&self) -> u8;
    fn free_memory_bytes(&self) -> u16;
    fn feature_bits(&self) -> u32;
}
