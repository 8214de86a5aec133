//! Command id space.
//!
//! Command ids are a flat 16-bit space, not a Rust enum: the low byte of
//! the system range (0x00-0x05) legitimately means two different things
//! depending on frame direction (a status code on a reply, a system
//! request id on a request), disambiguated by payload length rather than
//! by a distinct numeric value. Modeling that as a checked enum would
//! either lose the overlap or require a direction tag nothing else in
//! the wire format carries.

/// High bit of the 16-bit command id: set when the payload is
/// RLE-compressed. Applied uniformly to every command id.
pub const COMPRESSION_FLAG: u16 = 0x8000;

pub const STATUS_OK: u16 = 0x00;
pub const STATUS_ERROR: u16 = 0x01;
pub const STATUS_CMD_UNKNOWN: u16 = 0x02;
pub const STATUS_MALFORMED: u16 = 0x03;
pub const STATUS_CRC_MISMATCH: u16 = 0x04;
pub const STATUS_TIMEOUT: u16 = 0x05;
pub const STATUS_NOT_IMPLEMENTED: u16 = 0x06;
pub const STATUS_ACK: u16 = 0x07;

pub const CMD_XOFF: u16 = 0x08;
pub const CMD_XON: u16 = 0x09;

pub const CMD_GET_VERSION: u16 = 0x00;
pub const CMD_GET_FREE_MEMORY: u16 = 0x01;
pub const CMD_LINK_SYNC: u16 = 0x02;
pub const CMD_LINK_RESET: u16 = 0x03;
pub const CMD_GET_CAPABILITIES: u16 = 0x04;
pub const CMD_SET_BAUDRATE: u16 = 0x05;

pub const CMD_GET_VERSION_RESP: u16 = 0x80;
pub const CMD_DATASTORE_GET_RESP: u16 = 0x81;
pub const CMD_GET_FREE_MEMORY_RESP: u16 = 0x82;
pub const CMD_LINK_SYNC_RESP: u16 = 0x83;
pub const CMD_LINK_RESET_RESP: u16 = 0x84;
pub const CMD_GET_CAPABILITIES_RESP: u16 = 0x85;
pub const CMD_SET_BAUDRATE_RESP: u16 = 0x86;

pub const CMD_GPIO_SET_PIN_MODE: u16 = 0x10;
pub const CMD_GPIO_DIGITAL_WRITE: u16 = 0x11;
pub const CMD_GPIO_ANALOG_WRITE: u16 = 0x12;
pub const CMD_GPIO_DIGITAL_READ: u16 = 0x13;
pub const CMD_GPIO_ANALOG_READ: u16 = 0x14;
pub const CMD_GPIO_DIGITAL_READ_RESP: u16 = 0x15;
pub const CMD_GPIO_ANALOG_READ_RESP: u16 = 0x16;

pub const CMD_CONSOLE_WRITE: u16 = 0x20;

pub const CMD_DATASTORE_PUT: u16 = 0x30;
pub const CMD_DATASTORE_GET: u16 = 0x31;

pub const CMD_MAILBOX_READ: u16 = 0x40;
pub const CMD_MAILBOX_PROCESSED: u16 = 0x41;
pub const CMD_MAILBOX_AVAILABLE: u16 = 0x42;
pub const CMD_MAILBOX_PUSH: u16 = 0x43;
pub const CMD_MAILBOX_READ_RESP: u16 = 0x90;
pub const CMD_MAILBOX_AVAILABLE_RESP: u16 = 0x92;

pub const CMD_FS_WRITE: u16 = 0x50;
pub const CMD_FS_READ: u16 = 0x51;
pub const CMD_FS_REMOVE: u16 = 0x52;
pub const CMD_FS_READ_RESP: u16 = 0xA1;

pub const CMD_PROCESS_RUN: u16 = 0x60;
pub const CMD_PROCESS_RUN_ASYNC: u16 = 0x61;
pub const CMD_PROCESS_POLL: u16 = 0x62;
pub const CMD_PROCESS_KILL: u16 = 0x63;
pub const CMD_PROCESS_RUN_RESP: u16 = 0xB0;
pub const CMD_PROCESS_RUN_ASYNC_RESP: u16 = 0xB1;
pub const CMD_PROCESS_POLL_RESP: u16 = 0xB2;

/// Strips the compression flag, returning `(base_id, was_compressed)`.
pub const fn split_compression_flag(command_id: u16) -> (u16, bool) {
    (command_id & !COMPRESSION_FLAG, command_id & COMPRESSION_FLAG != 0)
}

pub const fn with_compression_flag(command_id: u16) -> u16 {
    command_id | COMPRESSION_FLAG
}

/// A command is critical (requires ACK and participates in
/// retransmission) iff its base id lies strictly above `STATUS_ACK`,
/// below the response range (0x80+, which is never critical — a
/// response is never itself retried by the responder), is not a
/// flow-control frame, and is not a GPIO read (reads get an immediate
/// response in place of an ACK; see dispatch in §4.7).
pub const fn is_critical(base_command_id: u16) -> bool {
    base_command_id > STATUS_ACK
        && base_command_id < 0x80
        && base_command_id != CMD_XOFF
        && base_command_id != CMD_XON
        && base_command_id != CMD_GPIO_DIGITAL_READ
        && base_command_id != CMD_GPIO_ANALOG_READ
}

pub const fn is_status_range(base_command_id: u16) -> bool {
    base_command_id <= STATUS_ACK
}

/// Disambiguates the overlap between a status code and a system command
/// sharing the same numeric id (0x00-0x05): the two are told apart by
/// payload length, never by id, since the wire format never carries a
/// direction tag. `SET_BAUDRATE` is the one exception — it was added
/// after the original status/system split and never shared its id with
/// a status code, so it is always a system command regardless of length.
///
/// The nonce/timing-config lengths below are duplicated from
/// `bridge_link::handshake::NONCE_LENGTH` / `timing::TIMING_CONFIG_PAYLOAD_LEN`
/// rather than imported: `bridge-link` depends on `bridge-proto`, not the
/// other way around.
pub const fn is_system_command(base_command_id: u16, payload_len: usize) -> bool {
    match base_command_id {
        CMD_GET_VERSION | CMD_GET_FREE_MEMORY | CMD_GET_CAPABILITIES => payload_len == 0,
        CMD_LINK_SYNC => payload_len == 16,
        CMD_LINK_RESET => payload_len == 0 || payload_len == crate::timing::TIMING_CONFIG_PAYLOAD_LEN,
        CMD_SET_BAUDRATE => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn compression_flag_round_trips() {
        let compressed = with_compression_flag(CMD_CONSOLE_WRITE);
        assert_eq!(split_compression_flag(compressed), (CMD_CONSOLE_WRITE, true));
        assert_eq!(split_compression_flag(CMD_CONSOLE_WRITE), (CMD_CONSOLE_WRITE, false));
    }

    #[test]
    fn status_codes_are_not_critical() {
        assert!(!is_critical(STATUS_ACK));
        assert!(!is_critical(STATUS_TIMEOUT));
        assert!(!is_critical(CMD_XOFF));
        assert!(!is_critical(CMD_XON));
    }

    #[test]
    fn requests_are_critical() {
        assert!(is_critical(CMD_CONSOLE_WRITE));
        assert!(is_critical(CMD_DATASTORE_PUT));
        assert!(is_critical(CMD_PROCESS_RUN));
    }

    #[test]
    fn responses_are_not_critical() {
        assert!(!is_critical(CMD_GET_VERSION_RESP));
        assert!(!is_critical(CMD_DATASTORE_GET_RESP));
        assert!(!is_critical(CMD_PROCESS_POLL_RESP));
    }

    #[test]
    fn gpio_reads_are_not_critical_but_writes_are() {
        assert!(!is_critical(CMD_GPIO_DIGITAL_READ));
        assert!(!is_critical(CMD_GPIO_ANALOG_READ));
        assert!(is_critical(CMD_GPIO_DIGITAL_WRITE));
        assert!(is_critical(CMD_GPIO_ANALOG_WRITE));
    }

    #[test]
    fn system_queries_overlapping_status_range_are_not_critical() {
        assert!(!is_critical(CMD_GET_VERSION));
        assert!(!is_critical(CMD_LINK_SYNC));
        assert!(!is_critical(CMD_SET_BAUDRATE));
    }

    #[test]
    fn zero_length_system_queries_are_not_status_codes() {
        assert!(is_system_command(CMD_GET_VERSION, 0));
        assert!(is_system_command(CMD_GET_FREE_MEMORY, 0));
        assert!(is_system_command(CMD_GET_CAPABILITIES, 0));
        assert!(!is_system_command(CMD_GET_VERSION, 1));
    }

    #[test]
    fn link_sync_needs_a_full_nonce_to_be_a_system_command() {
        assert!(is_system_command(CMD_LINK_SYNC, 16));
        assert!(!is_system_command(CMD_LINK_SYNC, 0));
        assert!(!is_system_command(CMD_LINK_SYNC, 2));
    }

    #[test]
    fn link_reset_accepts_empty_or_timing_config_payload() {
        assert!(is_system_command(CMD_LINK_RESET, 0));
        assert!(is_system_command(CMD_LINK_RESET, 7));
        assert!(!is_system_command(CMD_LINK_RESET, 3));
    }

    #[test]
    fn set_baudrate_is_always_a_system_command() {
        assert!(is_system_command(CMD_SET_BAUDRATE, 0));
        assert!(is_system_command(CMD_SET_BAUDRATE, 4));
        assert!(is_system_command(CMD_SET_BAUDRATE, 99));
    }

    #[test]
    fn ids_outside_the_overlap_are_never_system_commands() {
        assert!(!is_system_command(STATUS_NOT_IMPLEMENTED, 0));
        assert!(!is_system_command(CMD_CONSOLE_WRITE, 0));
    }
}
