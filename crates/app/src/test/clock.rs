//! Controllable clock.

use std::sync::Mutex;

use jiff::{SignedDuration, Timestamp};

use crate::clock::Clock;

/// 2026-01-05T10:00:00Z, a Monday morning.
const START: i64 = 1_767_607_200;

#[derive(Debug)]
pub(crate) struct FixedClock {
    now: Mutex<Timestamp>,
}

impl FixedClock {
    pub(crate) fn at(now: Timestamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(crate) fn advance(&self, by: SignedDuration) {
        let mut now = self.now.lock().expect("clock lock poisoned");

        *now = *now + by;
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at(Timestamp::from_second(START).expect("valid start timestamp"))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().expect("clock lock poisoned")
    }
}
