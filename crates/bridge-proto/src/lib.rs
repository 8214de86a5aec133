#![cfg_attr(not(test), no_std)]

//! Wire protocol: byte codecs (COBS, RLE), the binary frame layout,
//! the command id space, and the small payload shapes (capabilities,
//! handshake timing config) the system range carries.

pub mod capabilities;
pub mod cobs;
pub mod command;
pub mod error;
pub mod frame;
pub mod rle;
pub mod timing;

pub use error::{LinkError, Result};
pub use frame::{Frame, MAX_PAYLOAD, MAX_RAW_FRAME, PROTOCOL_VERSION};
