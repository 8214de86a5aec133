//! Fixed timer bank driven by a monotonic tick. No allocation, no
//! wall-clock reads outside [`TimerBank::tick`] — every deadline is a
//! countdown in milliseconds, decremented by the caller's own delta.

pub const NUMBER_OF_TIMERS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerId {
    AckTimeout = 0,
    RxDedupe = 1,
    BaudrateChange = 2,
    StartupStabilization = 3,
}

impl TimerId {
    const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Default)]
struct Timer {
    remaining_ms: Option<u32>,
}

/// The link's four timers. Arming an already-armed timer replaces its
/// deadline; ticking past zero fires the timer exactly once and
/// disarms it, so a caller that doesn't poll every millisecond never
/// sees a timer "double fire" for time that elapsed before it checked.
pub struct TimerBank {
    timers: [Timer; NUMBER_OF_TIMERS],
}

impl TimerBank {
    pub const fn new() -> Self {
        TimerBank {
            timers: [Timer { remaining_ms: None }; NUMBER_OF_TIMERS],
        }
    }

    pub fn arm(&mut self, id: TimerId, duration_ms: u32) {
        self.timers[id.index()].remaining_ms = Some(duration_ms);
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.timers[id.index()].remaining_ms = None;
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.timers[id.index()].remaining_ms.is_some()
    }

    /// Advances every armed timer by `delta_ms`. Returns the set of
    /// timers that expired on this tick as a bitmask (bit `i` set iff
    /// `TimerId` with `index() == i` fired).
    pub fn tick(&mut self, delta_ms: u32) -> u8 {
        let mut fired = 0u8;
        for (index, timer) in self.timers.iter_mut().enumerate() {
            if let Some(remaining) = timer.remaining_ms {
                if remaining <= delta_ms {
                    timer.remaining_ms = None;
                    fired |= 1 << index;
                } else {
                    timer.remaining_ms = Some(remaining - delta_ms);
                }
            }
        }
        fired
    }

    pub fn has_fired(fired_mask: u8, id: TimerId) -> bool {
        fired_mask & (1 << id.index()) != 0
    }
}
