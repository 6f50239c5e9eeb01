//! Test clock for driving voting windows by hand.

use std::cell::Cell;

use veranode_types::Timestamp;

/// Wall clock replacement. Engine calls take `now` explicitly, so tests
/// read it from here and move it between operations.
pub struct NullClock {
    now: Cell<Timestamp>,
}

impl NullClock {
    pub fn new(start_secs: u64) -> Self {
        Self {
            now: Cell::new(Timestamp::new(start_secs)),
        }
    }

    pub fn now(&self) -> Timestamp {
        self.now.get()
    }

    pub fn advance(&self, secs: u64) {
        self.now.set(self.now.get().plus_secs(secs));
    }

    pub fn advance_hours(&self, hours: u64) {
        self.advance(hours * 3600);
    }

    /// Stand exactly on `deadline`. Voting is still open there.
    pub fn at(&self, deadline: Timestamp) {
        self.now.set(deadline);
    }

    /// First second after `deadline`.
    pub fn just_past(&self, deadline: Timestamp) {
        self.now.set(deadline.plus_secs(1));
    }
}
