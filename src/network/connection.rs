//! Connection Handler
//!
//! Runs one client session: reads command frames in a loop, dispatches them
//! against the shared store, and writes responses back.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::dispatch::Dispatcher;
use crate::error::{Result, VaultError};
use crate::protocol::{read_command, write_response, Response};

/// Handles a single client session
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Routes commands to the shared store
    dispatcher: Arc<Dispatcher>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new session handler
    ///
    /// Sets up buffered I/O over a cloned stream pair.
    pub fn new(stream: TcpStream, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            dispatcher,
            peer_addr,
        })
    }

    /// Configure session timeouts
    ///
    /// The read timeout reclaims workers from clients that connect and then
    /// go silent mid-session.
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the session (blocking until closed)
    ///
    /// Reads command frames in a loop and sends responses. Returns when the
    /// client quits, disconnects, or goes silent past the read timeout.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("session established from {}", self.peer_addr);

        loop {
            let command = match read_command(&mut self.reader) {
                Ok(cmd) => cmd,
                Err(VaultError::Io(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    // Client disconnected gracefully
                    tracing::debug!("client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(VaultError::Io(ref e)) if e.kind() == std::io::ErrorKind::ConnectionReset => {
                    tracing::debug!("connection reset by client {}", self.peer_addr);
                    return Ok(());
                }
                Err(VaultError::Io(ref e)) if e.kind() == std::io::ErrorKind::ConnectionAborted => {
                    tracing::debug!("connection aborted by client {}", self.peer_addr);
                    return Ok(());
                }
                Err(VaultError::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    tracing::debug!("read timeout for client {}, closing session", self.peer_addr);
                    return Ok(());
                }
                Err(VaultError::Io(ref e)) if e.kind() == std::io::ErrorKind::TimedOut => {
                    // Read timeout (Windows uses TimedOut instead of WouldBlock)
                    tracing::debug!("read timeout for client {}, closing session", self.peer_addr);
                    return Ok(());
                }
                Err(e @ VaultError::FrameTooLarge { .. }) => {
                    // The advertised payload was never read, so the stream
                    // is out of sync; anything still in flight would decode
                    // as garbage frames. Report and close the session.
                    tracing::debug!(
                        "oversized frame from {}, closing session: {}",
                        self.peer_addr,
                        e
                    );
                    let _ = self.send_response(Response::error(e.to_string()));
                    return Ok(());
                }
                Err(
                    e @ (VaultError::InvalidCommand(_)
                    | VaultError::MalformedInput { .. }
                    | VaultError::Protocol(_)),
                ) => {
                    // The whole frame was consumed before decoding failed, so
                    // the stream is still in sync. Report and keep the
                    // session open.
                    tracing::debug!("bad request from {}: {}", self.peer_addr, e);
                    self.send_response(Response::error(e.to_string()))?;
                    continue;
                }
                Err(e) => {
                    tracing::warn!("error reading from {}: {}", self.peer_addr, e);
                    let _ = self.send_response(Response::error(e.to_string()));
                    return Err(e);
                }
            };

            tracing::trace!("received command from {}: {:?}", self.peer_addr, command);

            // Execute command; Quit yields no response and ends the session
            let response = match self.dispatcher.dispatch(command) {
                Some(response) => response,
                None => {
                    tracing::debug!("client {} quit", self.peer_addr);
                    return Ok(());
                }
            };

            if let Err(e) = self.send_response(response) {
                // If the client disconnected before we could send the
                // response, log and exit gracefully rather than treating it
                // as a server error.
                if let VaultError::Io(ref io_err) = e {
                    match io_err.kind() {
                        std::io::ErrorKind::ConnectionAborted
                        | std::io::ErrorKind::ConnectionReset
                        | std::io::ErrorKind::BrokenPipe => {
                            tracing::debug!(
                                "client {} disconnected before response could be sent: {}",
                                self.peer_addr,
                                e
                            );
                            return Ok(());
                        }
                        _ => {}
                    }
                }
                tracing::warn!("error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Send a response to the client
    fn send_response(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.writer, &response)?;
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
