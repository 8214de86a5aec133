mod bounded_index;
mod const_num;
mod ringbuffer;

pub use bounded_index::*;
pub use const_num::*;
pub use ringbuffer::*;
