//! Key/value datastore client. `GET` requests enqueue the key they
//! asked for; `DATASTORE_GET_RESP` pairs with the oldest pending key,
//! FIFO — the datastore itself lives on the peer, this crate only
//! correlates.

use bridge_common::util::RingBuffer;
use bridge_link::Sender;
use bridge_proto::command::{CMD_DATASTORE_GET, CMD_DATASTORE_PUT};
use bridge_proto::LinkError;

pub const MAX_KEY_LEN: usize = 64;

type Key = heapless::Vec<u8, MAX_KEY_LEN>;

/// `PENDING` bounds how many outstanding `GET`s this service tracks
/// (`MAX_PENDING_DATASTORE` in the reference configuration).
pub struct Datastore<const PENDING: usize> {
    pending_gets: RingBuffer<Key, PENDING>,
}

impl<const PENDING: usize> Datastore<PENDING> {
    pub const fn new() -> Self {
        Datastore { pending_gets: RingBuffer::new() }
    }

    pub fn put(&self, sender: &mut impl Sender, key: &[u8], value: &[u8]) -> Result<(), LinkError> {
        if key.len() > u8::MAX as usize || key.len() > MAX_KEY_LEN {
            return Err(LinkError::Overflow);
        }
        let mut payload = heapless::Vec::<u8, { MAX_KEY_LEN + 1 + 256 }>::new();
        payload.push(key.len() as u8).map_err(|_| LinkError::Overflow)?;
        payload.extend_from_slice(key).map_err(|_| LinkError::Overflow)?;
        payload.extend_from_slice(value).map_err(|_| LinkError::Overflow)?;
        sender.send(CMD_DATASTORE_PUT, &payload)
    }

    pub fn get(&mut self, sender: &mut impl Sender, key: &[u8]) -> Result<(), LinkError> {
        if key.len() > u8::MAX as usize || key.len() > MAX_KEY_LEN {
            return Err(LinkError::Overflow);
        }
        if self.pending_gets.is_full() {
            return Err(LinkError::QueueFull);
        }
        let mut payload = heapless::Vec::<u8, { MAX_KEY_LEN + 1 }>::new();
        payload.push(key.len() as u8).map_err(|_| LinkError::Overflow)?;
        payload.extend_from_slice(key).map_err(|_| LinkError::Overflow)?;
        sender.send(CMD_DATASTORE_GET, &payload)?;

        let owned: Key = heapless::Vec::from_slice(key).map_err(|_| LinkError::Overflow)?;
        self.pending_gets.push(owned);
        Ok(())
    }

    /// Pairs a `DATASTORE_GET_RESP` payload (`[value_len][value...]`)
    /// with the oldest pending key. Returns `None` if there was no
    /// pending `GET` to pair it with.
    pub fn on_get_response<'a>(&mut self, payload: &'a [u8]) -> Option<(Key, &'a [u8])> {
        let &value_len = payload.first()?;
        let value = payload.get(1..1 + value_len as usize)?;
        let key = self.pending_gets.poll_first()?;
        Some((key, value))
    }
}
