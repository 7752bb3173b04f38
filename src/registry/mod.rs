//! Registry Module
//!
//! In-memory table of scheduled trains.
//!
//! ## Responsibilities
//! - Hold the authoritative train set for the running process
//! - Serialize every read and write behind one exclusive lock
//! - Load (full swap) and save the table through a snapshot store
//! - Persist after every mutation, before the caller can report success
//!
//! ## Data Structure Choice
//! A plain `Vec` in load order, searched linearly. SCHEDULE lists trains in
//! file order.

mod presentation;
mod table;
mod train;

pub use presentation::{
    FixedAssigner, Presentation, PresentationAssigner, RandomAssigner, AMENITY_OPTIONS,
    ROUTE_CITIES,
};
pub use table::Registry;
pub use train::{
    Status, TimeOfDay, TimePoint, TrainRecord, CANCELLED_DELAY, MAX_ID_LEN, MINUTES_PER_DAY,
    NEXT_HOUR_WINDOW,
};
