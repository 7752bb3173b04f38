//! Commands Module
//!
//! Maps a command line to a handler and runs it against the registry.
//!
//! ## Commands (table order)
//! - `SCHEDULE`: full listing with live status
//! - `DEPARTURES` / `ARRIVALS`: trains due in the next hour
//! - `UPDATE <id> <delay>`: set a delay
//! - `RELOAD`: reload the registry from its snapshot
//! - `STATS`: network analytics
//! - `RESET [id]`: clear one delay or all of them
//! - `CANCEL <id>`: cancel a train
//! - `DETAILS <id>`: train card
//! - `REPORT <message>`: append to the report log
//! - `ESTIMATE <id> <km>`: trip time estimate
//!
//! Every handler produces exactly one response string. Failures are
//! [`CommandError`]s whose `Display` is the text sent to the client.

mod dispatcher;
mod handlers;
mod report;

use thiserror::Error;

pub use dispatcher::{CommandSpec, Dispatcher, COMMANDS};
pub use handlers::NetworkStats;
pub use report::ReportLog;

/// Command-level failures, rendered verbatim as the response body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    // -------------------------------------------------------------------------
    // Malformed Arguments
    // -------------------------------------------------------------------------
    #[error("Usage: UPDATE <ID> <Delay>")]
    UpdateUsage,

    #[error("Usage: CANCEL <TrainID>")]
    CancelUsage,

    #[error("Usage: DETAILS <TrainID>")]
    DetailsUsage,

    #[error("Usage: ESTIMATE <TrainID> <Distance_KM>")]
    EstimateUsage,

    #[error("Usage: REPORT <Message> (Please describe the issue)")]
    ReportUsage,

    #[error("Invalid delay: {0} is reserved for cancellations.")]
    ReservedDelay(i32),

    #[error("Invalid distance: must be a positive number of km.")]
    InvalidDistance,

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------
    #[error("Train not found.")]
    NotFound,

    #[error("Unknown command.")]
    UnknownCommand,

    #[error("Train ID not found.")]
    ResetNotFound,

    // -------------------------------------------------------------------------
    // Cancelled Trains
    // -------------------------------------------------------------------------
    #[error("ERROR: Train is CANCELLED. Cannot update delay.\nUse RESET to restore service first.")]
    UpdateCancelled,

    #[error("OPERATION FAILED: Train is CANCELLED.\nNo estimation possible.")]
    EstimateCancelled,

    #[error("ERROR: Train is CANCELLED. Reset not applied.")]
    ResetCancelled,

    // -------------------------------------------------------------------------
    // Side Effects
    // -------------------------------------------------------------------------
    #[error("Server Error: Could not save report.")]
    ReportFailed,

    #[error("Server Error: Could not reload {0}.")]
    ReloadFailed(String),

    #[error("Server Error: Could not process command.")]
    Internal,
}
