/// Link reliability state. *Fault* is terminal until the application
/// rebuilds the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Unsynchronized,
    Idle,
    AwaitingAck,
    Fault,
}

impl LinkState {
    pub const fn is_fault(self) -> bool {
        matches!(self, LinkState::Fault)
    }

    pub const fn is_synchronized(self) -> bool {
        matches!(self, LinkState::Idle | LinkState::AwaitingAck)
    }

    pub fn handshake_complete(self) -> LinkState {
        match self {
            LinkState::Unsynchronized => LinkState::Idle,
            other => other,
        }
    }

    pub fn send_critical(self) -> LinkState {
        match self {
            LinkState::Idle => LinkState::AwaitingAck,
            other => other,
        }
    }

    pub fn ack_received(self) -> LinkState {
        match self {
            LinkState::AwaitingAck => LinkState::Idle,
            other => other,
        }
    }

    pub fn timeout(self) -> LinkState {
        match self {
            LinkState::AwaitingAck => LinkState::Unsynchronized,
            other => other,
        }
    }

    /// `reset` always lands on Unsynchronized, even from Fault — this is
    /// the only transition out of Fault.
    pub fn reset(self) -> LinkState {
        LinkState::Unsynchronized
    }

    pub fn crypto_fault(self) -> LinkState {
        LinkState::Fault
    }
}
