#![cfg_attr(not(test), no_std)]

//! Capability clients built on top of `bridge-link`'s `Sender`: console
//! output, the key/value datastore, filesystem access, the mailbox, and
//! remote process control. Each service only tracks what it must to
//! correlate a response with the request that asked for it — the
//! resource itself lives on the peer.

pub mod console;
pub mod datastore;
pub mod filesystem;
pub mod mailbox;
pub mod process;

pub use console::Console;
pub use datastore::Datastore;
pub use filesystem::Filesystem;
pub use mailbox::Mailbox;
pub use process::{Pid, Process};
