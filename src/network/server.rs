//! TCP Server
//!
//! Accepts connections and dispatches them to a fixed worker pool.
//!
//! Sessions are bounded: `max_connections` workers pull streams from a
//! bounded channel, and when every worker is busy and the queue is full the
//! acceptor refuses the connection with a "server busy" response instead of
//! queueing without limit.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, TrySendError};

use crate::catalog::MovieStore;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::protocol::{write_response, Response};

use super::Connection;

/// How long the acceptor sleeps between polls when idle
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// TCP server for cinevault
pub struct Server {
    config: Config,
    dispatcher: Arc<Dispatcher>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind the listen address and prepare a server over the given store
    pub fn bind(config: Config, store: Arc<MovieStore>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;

        // Non-blocking accept so the loop can observe the shutdown flag
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            dispatcher: Arc::new(Dispatcher::new(store)),
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The address the server actually bound (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// A flag that can be set from another thread to stop the accept loop
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Run the server (blocking)
    ///
    /// Spawns the worker pool, then accepts connections until the shutdown
    /// flag is set. Returns after all workers have drained.
    pub fn run(&mut self) -> Result<()> {
        let workers = self.config.max_connections.max(1);
        let (sender, receiver) = channel::bounded::<TcpStream>(workers);

        let handles: Vec<_> = (0..workers)
            .map(|index| self.spawn_worker(index, receiver.clone()))
            .collect::<Result<_>>()?;

        tracing::info!(
            addr = %self.local_addr()?,
            workers,
            "server listening"
        );

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    tracing::debug!("accepted connection from {}", peer);
                    match sender.try_send(stream) {
                        Ok(()) => {}
                        Err(TrySendError::Full(stream)) => {
                            tracing::warn!("session limit reached, refusing {}", peer);
                            Self::refuse_busy(stream);
                        }
                        Err(TrySendError::Disconnected(_)) => break,
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("accept failed: {}", e);
                }
            }
        }

        // Close the channel so idle workers exit; busy ones finish their
        // current session first.
        drop(sender);
        for handle in handles {
            let _ = handle.join();
        }

        tracing::info!("server stopped");
        Ok(())
    }

    /// Signal the server to shut down after the current accept poll
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Spawn one session worker pulling streams off the channel
    fn spawn_worker(
        &self,
        index: usize,
        receiver: Receiver<TcpStream>,
    ) -> Result<thread::JoinHandle<()>> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let read_timeout_ms = self.config.read_timeout_ms;
        let write_timeout_ms = self.config.write_timeout_ms;

        let handle = thread::Builder::new()
            .name(format!("session-worker-{}", index))
            .spawn(move || {
                for stream in receiver.iter() {
                    // Workers handed a stream by the acceptor switch it back
                    // to blocking reads.
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("failed to configure stream: {}", e);
                        continue;
                    }

                    match Connection::new(stream, Arc::clone(&dispatcher)) {
                        Ok(mut connection) => {
                            if let Err(e) =
                                connection.set_timeouts(read_timeout_ms, write_timeout_ms)
                            {
                                tracing::warn!("failed to set session timeouts: {}", e);
                                continue;
                            }
                            if let Err(e) = connection.handle() {
                                // A failed session never takes the server
                                // down with it.
                                tracing::warn!(
                                    "session {} ended with error: {}",
                                    connection.peer_addr(),
                                    e
                                );
                            }
                        }
                        Err(e) => tracing::warn!("failed to set up session: {}", e),
                    }
                }
            })?;

        Ok(handle)
    }

    /// Tell a refused client the server is saturated, then drop the stream
    fn refuse_busy(stream: TcpStream) {
        let mut stream = stream;
        let _ = stream.set_nonblocking(false);
        let _ = write_response(
            &mut stream,
            &Response::error("server busy, try again later"),
        );
    }
}
