//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Fixed worker pool for sessions, fed by a bounded channel
//! - Commands routed through the Dispatcher to the shared store

mod client;
mod connection;
mod server;

pub use client::Client;
pub use connection::Connection;
pub use server::Server;
