//! TCP Server
//!
//! Accepts connections, spawns a reader per connection, and applies control
//! events (reload, shutdown) between accepts.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use crossbeam::channel::{Receiver, RecvTimeoutError, TryRecvError};

use crate::commands::Dispatcher;
use crate::config::Config;
use crate::error::{Result, StationError};
use crate::queue::WorkQueue;

use super::connection::Connection;
use super::control::{control_channel, Control, ControlHandle};
use super::worker::WorkerPool;

/// TCP server for trainstation
pub struct Server {
    config: Config,
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    queue: Arc<WorkQueue>,
    control: ControlHandle,
    control_rx: Receiver<Control>,
}

impl Server {
    /// Validate the config and bind the listening socket
    ///
    /// Failing to bind is the one fatal startup error.
    pub fn bind(config: Config, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            StationError::Network(format!("failed to bind {}: {}", config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        let queue = Arc::new(WorkQueue::new(config.queue_capacity));
        let (control, control_rx) = control_channel();

        Ok(Self {
            config,
            listener,
            dispatcher,
            queue,
            control,
            control_rx,
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for delivering reload/shutdown events to [`Server::run`]
    pub fn control(&self) -> ControlHandle {
        self.control.clone()
    }

    /// The shared work queue
    pub fn queue(&self) -> &Arc<WorkQueue> {
        &self.queue
    }

    /// Start the workers and serve until a shutdown event (blocking)
    pub fn run(self) -> Result<()> {
        let workers = WorkerPool::spawn(
            self.config.worker_threads,
            Arc::clone(&self.queue),
            Arc::clone(&self.dispatcher),
        )?;

        tracing::info!("Listening on {}", self.local_addr()?);
        self.accept_loop();

        tracing::info!("Shutting down: draining work queue");
        self.queue.close();
        workers.join();
        tracing::info!("Server stopped");
        Ok(())
    }

    /// Returns once a shutdown event arrives
    fn accept_loop(&self) {
        let tick = self.config.poll_interval();

        loop {
            loop {
                match self.control_rx.try_recv() {
                    Ok(event) => {
                        if !self.apply(event) {
                            return;
                        }
                    }
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                }
            }

            match self.listener.accept() {
                Ok((stream, addr)) => self.spawn_connection(stream, addr),
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    // Idle: wait one tick for a control event
                    match self.control_rx.recv_timeout(tick) {
                        Ok(event) => {
                            if !self.apply(event) {
                                return;
                            }
                        }
                        Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {}
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(tick);
                }
            }
        }
    }

    /// Apply one control event; false means stop serving
    fn apply(&self, event: Control) -> bool {
        match event {
            Control::Reload => {
                let registry = self.dispatcher.registry();
                match registry.load() {
                    Ok(count) => tracing::info!("Hot reload complete: {} trains", count),
                    Err(e) => tracing::warn!(
                        "Hot reload from {} failed: {} (keeping current registry)",
                        registry.store_description(),
                        e
                    ),
                }
                true
            }
            Control::Shutdown => false,
        }
    }

    /// Detach a reader thread for one accepted socket
    fn spawn_connection(&self, stream: TcpStream, addr: SocketAddr) {
        // Accepted sockets inherit non-blocking mode on some platforms
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Dropping connection from {}: {}", addr, e);
            return;
        }

        let queue = Arc::clone(&self.queue);
        let config = self.config.clone();
        let spawned = thread::Builder::new()
            .name(format!("conn-{}", addr))
            .spawn(move || match Connection::new(stream, queue, &config) {
                Ok(mut connection) => {
                    if let Err(e) = connection.handle() {
                        tracing::debug!("Connection {} ended with error: {}", addr, e);
                    }
                }
                Err(e) => tracing::warn!("Failed to set up connection from {}: {}", addr, e),
            });

        if let Err(e) = spawned {
            tracing::warn!("Could not spawn reader for {}: {}", addr, e);
        }
    }
}
