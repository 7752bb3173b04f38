//! Train records
//!
//! Time-of-day arithmetic and the per-train record held by the registry.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minutes in a day; all time-of-day arithmetic wraps at this modulus
pub const MINUTES_PER_DAY: i32 = 1440;

/// Reserved delay value meaning "train is cancelled"
pub const CANCELLED_DELAY: i32 = -999;

/// Longest identifier a train can carry
pub const MAX_ID_LEN: usize = 14;

/// Width of the DEPARTURES/ARRIVALS look-ahead window (minutes)
pub const NEXT_HOUR_WINDOW: i32 = 60;

// =============================================================================
// TimeOfDay
// =============================================================================

/// A minute of the day in `0..1440`, rendered as `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Midnight
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Build from hour and minute, wrapping past midnight
    pub fn from_hm(hour: u32, minute: u32) -> Self {
        Self::from_minutes((hour * 60 + minute) as i32)
    }

    /// Build from a (possibly negative or overflowing) minute count
    pub fn from_minutes(minutes: i32) -> Self {
        TimeOfDay(minutes.rem_euclid(MINUTES_PER_DAY) as u16)
    }

    /// Parse `HH:MM` (hours `0..24`, minutes `0..60`)
    pub fn parse(text: &str) -> Option<Self> {
        let (h, m) = text.trim().split_once(':')?;
        let hour: u32 = h.trim().parse().ok()?;
        let minute: u32 = m.trim().parse().ok()?;
        if hour >= 24 || minute >= 60 {
            return None;
        }
        Some(Self::from_hm(hour, minute))
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Minutes since midnight
    pub fn minutes(self) -> i32 {
        self.0 as i32
    }

    /// Shift by a signed number of minutes, modulo a day
    ///
    /// Any `i32` is accepted; the shift is reduced modulo a day first.
    pub fn offset(self, minutes: i32) -> Self {
        Self::from_minutes(self.minutes() + minutes.rem_euclid(MINUTES_PER_DAY))
    }

    /// Forward circular distance from `self` to `later`, in `0..1440`
    pub fn minutes_until(self, later: TimeOfDay) -> i32 {
        (later.minutes() - self.minutes()).rem_euclid(MINUTES_PER_DAY)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

// =============================================================================
// Status
// =============================================================================

/// Which scheduled time of a train a status refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePoint {
    Departure,
    Arrival,
}

/// Live status of one time point of a train
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Cancelled,
    Departed,
    Arrived,
    Delayed,
    Early,
    OnTime,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Cancelled => "[CANCELLED]",
            Status::Departed => "[DEPARTED]",
            Status::Arrived => "[ARRIVED]",
            Status::Delayed => "[DELAYED]",
            Status::Early => "[EARLY]",
            Status::OnTime => "[ON TIME]",
        };
        f.write_str(label)
    }
}

// =============================================================================
// TrainRecord
// =============================================================================

/// One scheduled train
///
/// The estimated arrival is never stored: [`TrainRecord::eta`] derives it from
/// the arrival time and the current delay, so every delay mutation is
/// reflected immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainRecord {
    pub id: String,
    pub departure: TimeOfDay,
    pub arrival: TimeOfDay,
    delay: i32,
    /// Presentation only; re-assigned on every load
    pub amenities: String,
    /// Presentation only; re-assigned on every load
    pub route: String,
}

impl TrainRecord {
    pub fn new(id: impl Into<String>, departure: TimeOfDay, arrival: TimeOfDay, delay: i32) -> Self {
        Self {
            id: id.into(),
            departure,
            arrival,
            delay,
            amenities: String::new(),
            route: String::new(),
        }
    }

    /// Current delay in minutes (`CANCELLED_DELAY` when cancelled)
    pub fn delay(&self) -> i32 {
        self.delay
    }

    pub fn is_cancelled(&self) -> bool {
        self.delay == CANCELLED_DELAY
    }

    pub fn set_delay(&mut self, minutes: i32) {
        self.delay = minutes;
    }

    pub fn cancel(&mut self) {
        self.delay = CANCELLED_DELAY;
    }

    /// Estimated arrival, `None` for a cancelled train
    pub fn eta(&self) -> Option<TimeOfDay> {
        if self.is_cancelled() {
            None
        } else {
            Some(self.arrival.offset(self.delay))
        }
    }

    /// ETA as shown to clients (`--:--` when cancelled)
    pub fn eta_display(&self) -> String {
        match self.eta() {
            Some(eta) => eta.to_string(),
            None => "--:--".to_string(),
        }
    }

    pub fn scheduled(&self, point: TimePoint) -> TimeOfDay {
        match point {
            TimePoint::Departure => self.departure,
            TimePoint::Arrival => self.arrival,
        }
    }

    /// Scheduled time shifted by the delay
    pub fn adjusted(&self, point: TimePoint) -> TimeOfDay {
        self.scheduled(point).offset(self.delay)
    }

    /// Status of one time point relative to `now`
    pub fn status(&self, point: TimePoint, now: TimeOfDay) -> Status {
        if self.is_cancelled() {
            return Status::Cancelled;
        }
        if now >= self.adjusted(point) {
            return match point {
                TimePoint::Departure => Status::Departed,
                TimePoint::Arrival => Status::Arrived,
            };
        }
        match self.delay {
            d if d > 0 => Status::Delayed,
            d if d < 0 => Status::Early,
            _ => Status::OnTime,
        }
    }

    /// True when the adjusted time falls in `[now, now + 60]`, wrapping at midnight
    pub fn within_next_hour(&self, point: TimePoint, now: TimeOfDay) -> bool {
        !self.is_cancelled() && now.minutes_until(self.adjusted(point)) <= NEXT_HOUR_WINDOW
    }
}
