//! Wall-clock access
//!
//! Handlers never read the system time directly; they go through a [`Clock`]
//! so tests can pin "now" to a fixed minute of the day.

use chrono::{Local, Timelike};

use crate::registry::TimeOfDay;

/// Source of the current local time
pub trait Clock: Send + Sync {
    /// Current minute of the day
    fn now(&self) -> TimeOfDay;

    /// Human-readable timestamp used in the report log
    fn timestamp(&self) -> String;
}

/// Local wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimeOfDay {
        let now = Local::now();
        TimeOfDay::from_hm(now.hour(), now.minute())
    }

    fn timestamp(&self) -> String {
        Local::now().format("%a %b %e %H:%M:%S %Y").to_string()
    }
}

/// Clock frozen at a given time of day
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: TimeOfDay,
}

impl FixedClock {
    pub fn new(now: TimeOfDay) -> Self {
        Self { now }
    }

    pub fn at(hour: u32, minute: u32) -> Self {
        Self::new(TimeOfDay::from_hm(hour, minute))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> TimeOfDay {
        self.now
    }

    fn timestamp(&self) -> String {
        format!("Thu Jan  1 {}:00 1970", self.now)
    }
}
