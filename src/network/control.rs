//! Control Channel
//!
//! Out-of-band events for the listener loop. Anything holding a
//! [`ControlHandle`] can request a reload or a shutdown; on Unix the server
//! binary also forwards process signals into the same channel.

use crossbeam::channel::{self, Receiver, Sender};

/// Event delivered to the listener between accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Reload the registry from its snapshot
    Reload,

    /// Stop accepting, drain the queue, stop the workers
    Shutdown,
}

/// Cloneable sender for [`Control`] events
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: Sender<Control>,
}

impl ControlHandle {
    /// Ask the listener to reload on its next tick; false if it is gone
    pub fn reload(&self) -> bool {
        self.tx.send(Control::Reload).is_ok()
    }

    /// Ask the listener to stop; false if it is gone
    pub fn shutdown(&self) -> bool {
        self.tx.send(Control::Shutdown).is_ok()
    }
}

/// Create a handle and the receiver the listener polls
pub(crate) fn control_channel() -> (ControlHandle, Receiver<Control>) {
    let (tx, rx) = channel::unbounded();
    (ControlHandle { tx }, rx)
}

/// Forward SIGUSR1 as [`Control::Reload`] and SIGINT/SIGTERM as
/// [`Control::Shutdown`] from a background thread
#[cfg(unix)]
pub fn forward_signals(handle: ControlHandle) -> std::io::Result<std::thread::JoinHandle<()>> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM, SIGUSR1};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGUSR1, SIGINT, SIGTERM])?;
    std::thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                if signal == SIGUSR1 {
                    tracing::info!("Received SIGUSR1, scheduling reload");
                    if !handle.reload() {
                        break;
                    }
                } else {
                    tracing::info!(signal, "Received termination signal, initiating shutdown");
                    handle.shutdown();
                    break;
                }
            }
        })
}
