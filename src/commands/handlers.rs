//! Command handlers
//!
//! Each handler parses its free-text arguments, works on the registry inside a
//! single lock scope, and returns the response body. None of them touch a
//! socket.

use std::fmt::Write as _;

use crate::config::ResetPolicy;
use crate::registry::{TimePoint, TrainRecord, CANCELLED_DELAY};

use super::dispatcher::Dispatcher;
use super::CommandError;

/// Average speed of a regular train (km/h)
const BASE_SPEED_KMH: u32 = 80;

/// Average speed when the amenities advertise the premium keyword (km/h)
const HIGH_SPEED_KMH: u32 = 140;

/// Amenity keyword selecting [`HIGH_SPEED_KMH`]
const HIGH_SPEED_KEYWORD: &str = "High-Speed";

/// Minimum REPORT message length
const MIN_REPORT_LEN: usize = 5;

/// Arguments and origin of one command
pub(crate) struct Invocation<'a> {
    /// Text after the keyword
    pub args: &'a str,

    /// Peer label of the requesting connection
    pub peer: &'a str,
}

type HandlerResult = Result<String, CommandError>;

// =============================================================================
// Listings
// =============================================================================

pub(crate) fn schedule(d: &Dispatcher, _inv: &Invocation<'_>) -> HandlerResult {
    let now = d.clock.now();
    let mut out = String::from("\n--- DAILY SCHEDULE ---\n");

    d.registry.read(|trains| {
        for t in trains {
            let delay = if t.is_cancelled() {
                "!!! CANCELLED !!!".to_string()
            } else {
                format!("Delay {} min", t.delay())
            };
            let _ = writeln!(
                out,
                "{} | Dep {} {} | Arr {} {} | {} | ETA {}",
                t.id,
                t.departure,
                t.status(TimePoint::Departure, now),
                t.arrival,
                t.status(TimePoint::Arrival, now),
                delay,
                t.eta_display()
            );
        }
    });

    Ok(out)
}

pub(crate) fn departures(d: &Dispatcher, _inv: &Invocation<'_>) -> HandlerResult {
    Ok(next_hour(d, TimePoint::Departure))
}

pub(crate) fn arrivals(d: &Dispatcher, _inv: &Invocation<'_>) -> HandlerResult {
    Ok(next_hour(d, TimePoint::Arrival))
}

fn next_hour(d: &Dispatcher, point: TimePoint) -> String {
    let now = d.clock.now();
    let (title, noun) = match point {
        TimePoint::Departure => ("DEPARTURES", "departures"),
        TimePoint::Arrival => ("ARRIVALS", "arrivals"),
    };
    let mut out = format!("\n{} (NEXT HOUR):\n", title);
    let mut found = false;

    d.registry.read(|trains| {
        for t in trains.iter().filter(|t| t.within_next_hour(point, now)) {
            found = true;
            let detail = delay_detail(t);
            let _ = match point {
                TimePoint::Departure => {
                    writeln!(out, "> {} | Plan {} | {}", t.id, t.departure, detail)
                }
                TimePoint::Arrival => writeln!(
                    out,
                    "> {} | Plan {} | ETA {} {}",
                    t.id,
                    t.arrival,
                    t.eta_display(),
                    detail
                ),
            };
        }
    });

    if !found {
        let _ = writeln!(out, "   (No {} scheduled in the next hour)", noun);
    }
    out
}

fn delay_detail(t: &TrainRecord) -> String {
    match t.delay() {
        d if d > 0 => format!("[DELAYED by {} min]", d),
        d if d < 0 => format!("[EARLY by {} min]", d.unsigned_abs()),
        _ => "[ON TIME]".to_string(),
    }
}

// =============================================================================
// Mutations
// =============================================================================

pub(crate) fn update(d: &Dispatcher, inv: &Invocation<'_>) -> HandlerResult {
    let mut args = inv.args.split_whitespace();
    let (Some(id), Some(delay)) = (args.next(), args.next()) else {
        return Err(CommandError::UpdateUsage);
    };
    let delay: i32 = delay.parse().map_err(|_| CommandError::UpdateUsage)?;

    d.registry
        .mutate(id, |t| {
            if t.is_cancelled() {
                return Err(CommandError::UpdateCancelled);
            }
            if delay == CANCELLED_DELAY {
                return Err(CommandError::ReservedDelay(delay));
            }
            t.set_delay(delay);
            Ok(())
        })
        .ok_or(CommandError::NotFound)??;

    tracing::info!("Train {} updated with {} min delay", id, delay);
    Ok("Update successful.".to_string())
}

pub(crate) fn cancel(d: &Dispatcher, inv: &Invocation<'_>) -> HandlerResult {
    let id = inv.args.split_whitespace().next().ok_or(CommandError::CancelUsage)?;

    d.registry
        .mutate(id, |t| {
            t.cancel();
            Ok::<_, CommandError>(())
        })
        .ok_or(CommandError::NotFound)??;

    tracing::info!("Train {} cancelled", id);
    Ok(format!(
        "ALERT: Train {} has been CANCELLED due to technical issues.",
        id
    ))
}

pub(crate) fn reset(d: &Dispatcher, inv: &Invocation<'_>) -> HandlerResult {
    let keep_cancelled = d.reset_policy == ResetPolicy::KeepCancelled;

    let Some(id) = inv.args.split_whitespace().next() else {
        let touched = d.registry.mutate_all(|t| {
            if keep_cancelled && t.is_cancelled() {
                return false;
            }
            t.set_delay(0);
            true
        });
        tracing::info!("Global reset cleared {} delays", touched);
        return Ok("ADMIN: All delays reset to 0 (Global Reset).".to_string());
    };

    let outcome = d.registry.mutate(id, |t| {
        if keep_cancelled && t.is_cancelled() {
            return Err(CommandError::ResetCancelled);
        }
        t.set_delay(0);
        Ok(())
    });

    let Some(outcome) = outcome else {
        // An unknown id still rewrites the snapshot
        if let Err(e) = d.registry.save() {
            tracing::warn!("Failed to save snapshot after RESET {}: {}", id, e);
        }
        return Err(CommandError::ResetNotFound);
    };
    outcome?;

    tracing::info!("Train {} delay reset", id);
    Ok(format!(
        "Delay reset for train {}. Status is now ON TIME.",
        id
    ))
}

pub(crate) fn reload(d: &Dispatcher, _inv: &Invocation<'_>) -> HandlerResult {
    let source = d.registry.store_description();
    match d.registry.load() {
        Ok(_) => Ok(format!("Reloaded {}.", source)),
        Err(e) => {
            tracing::warn!("Reload from {} failed: {}", source, e);
            Err(CommandError::ReloadFailed(source))
        }
    }
}

// =============================================================================
// Per-Train Queries
// =============================================================================

pub(crate) fn details(d: &Dispatcher, inv: &Invocation<'_>) -> HandlerResult {
    let id = inv.args.split_whitespace().next().ok_or(CommandError::DetailsUsage)?;

    d.registry
        .read_train(id, |t| {
            let status = match t.delay() {
                _ if t.is_cancelled() => "CANCELLED".to_string(),
                delay if delay > 0 => format!("DELAYED ({} min)", delay),
                delay if delay < 0 => format!("EARLY ({} min)", delay.unsigned_abs()),
                _ => "ON TIME".to_string(),
            };
            let delay = if t.is_cancelled() {
                "--".to_string()
            } else {
                format!("{} min", t.delay())
            };
            format!(
                "\n========================================\n\
                 \x20      TRAIN DETAILS: {}\n\
                 ========================================\n\
                 \x20Status:      {}\n\
                 \x20Schedule:    Dep {} | Arr {}\n\
                 \x20Delay:       {}\n\
                 \x20ETA:         {}\n\
                 \x20Route:       {}\n\
                 \x20Amenities:   {}\n\
                 \x20Engine Type: Electric (Eco-Friendly)\n\
                 \x20Max Speed:   160 km/h\n\
                 \x20Capacity:    180 Seats\n\
                 ========================================\n",
                t.id,
                status,
                t.departure,
                t.arrival,
                delay,
                t.eta_display(),
                t.route,
                t.amenities
            )
        })
        .ok_or(CommandError::NotFound)
}

pub(crate) fn estimate(d: &Dispatcher, inv: &Invocation<'_>) -> HandlerResult {
    let mut args = inv.args.split_whitespace();
    let (Some(id), Some(km)) = (args.next(), args.next()) else {
        return Err(CommandError::EstimateUsage);
    };
    let km: i64 = km.parse().map_err(|_| CommandError::EstimateUsage)?;
    if km <= 0 {
        return Err(CommandError::InvalidDistance);
    }
    let km_minutes = km.checked_mul(60).ok_or(CommandError::InvalidDistance)?;

    d.registry
        .read_train(id, |t| {
            if t.is_cancelled() {
                return Err(CommandError::EstimateCancelled);
            }

            let speed = if t.amenities.contains(HIGH_SPEED_KEYWORD) {
                HIGH_SPEED_KMH
            } else {
                BASE_SPEED_KMH
            };
            let travel = km_minutes / speed as i64;
            let delay = t.delay() as i64;
            let total = travel + delay;

            Ok(format!(
                "\n--- TRIP ESTIMATOR: {} ---\n\
                 \x20Distance:      {} km\n\
                 \x20Avg Speed:     {} km/h\n\
                 \x20Travel Time:   {} h {} min\n\
                 \x20Current Delay: {} min\n\
                 \x20-------------------------\n\
                 \x20TOTAL ETA:     {} h {} min\n",
                t.id,
                km,
                speed,
                travel / 60,
                travel % 60,
                delay,
                total / 60,
                total % 60
            ))
        })
        .ok_or(CommandError::NotFound)?
}

// =============================================================================
// Analytics
// =============================================================================

/// Aggregates reported by STATS
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkStats {
    pub total: usize,
    pub cancelled: usize,
    pub delayed: usize,
    pub on_time: usize,
    pub total_delay: i64,
    pub max_delay: i32,
    /// First train (scan order) holding `max_delay`
    pub worst_train: Option<String>,
}

impl NetworkStats {
    pub fn compute(trains: &[TrainRecord]) -> Self {
        let mut stats = NetworkStats {
            total: trains.len(),
            cancelled: 0,
            delayed: 0,
            on_time: 0,
            total_delay: 0,
            max_delay: 0,
            worst_train: None,
        };

        for t in trains {
            if t.is_cancelled() {
                stats.cancelled += 1;
            } else if t.delay() > 0 {
                stats.delayed += 1;
                stats.total_delay += t.delay() as i64;
                if t.delay() > stats.max_delay {
                    stats.max_delay = t.delay();
                    stats.worst_train = Some(t.id.clone());
                }
            }
        }

        let active = stats.total - stats.cancelled;
        stats.on_time = active.saturating_sub(stats.delayed);
        stats
    }

    /// Mean delay over delayed trains
    pub fn average_delay(&self) -> f64 {
        if self.delayed == 0 {
            0.0
        } else {
            self.total_delay as f64 / self.delayed as f64
        }
    }

    pub fn health(&self) -> &'static str {
        if self.cancelled > 0 {
            "CRITICAL (Cancellations)"
        } else if self.delayed > 0 {
            "WARNING"
        } else {
            "EXCELLENT"
        }
    }
}

pub(crate) fn stats(d: &Dispatcher, _inv: &Invocation<'_>) -> HandlerResult {
    let stats = d.registry.read(NetworkStats::compute);

    Ok(format!(
        "\n=== NETWORK ANALYTICS ===\n\
         \x20Total Trains:           {}\n\
         \x20-------------------------\n\
         \x20[!] CANCELLED:          {}\n\
         \x20[!] DELAYED:            {}\n\
         \x20[OK] ON TIME:           {}\n\
         \x20-------------------------\n\
         \x20Avg Delay (Active):     {:.2} min\n\
         \x20Worst Delay:            {} min (Train: {})\n\
         \x20System Health:          {}\n",
        stats.total,
        stats.cancelled,
        stats.delayed,
        stats.on_time,
        stats.average_delay(),
        stats.max_delay,
        stats.worst_train.as_deref().unwrap_or("None"),
        stats.health()
    ))
}

// =============================================================================
// Side File
// =============================================================================

pub(crate) fn report(d: &Dispatcher, inv: &Invocation<'_>) -> HandlerResult {
    let message = inv.args.trim();
    if message.chars().count() < MIN_REPORT_LEN {
        return Err(CommandError::ReportUsage);
    }

    match d.reports.append(&d.clock.timestamp(), inv.peer, message) {
        Ok(()) => {
            tracing::info!("New report logged from client {}", inv.peer);
            Ok("Your report has been logged. Support team will investigate.".to_string())
        }
        Err(e) => {
            tracing::warn!(
                "Could not append to {}: {}",
                d.reports.path().display(),
                e
            );
            Err(CommandError::ReportFailed)
        }
    }
}
