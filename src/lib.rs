//! # cinevault
//!
//! A concurrent movie-record server:
//! - Shared catalog behind one exclusive lock
//! - Flat-file persistence rewritten after every mutation (atomic rename)
//! - Length-prefixed TCP protocol
//! - Bounded session worker pool
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │            (acceptor + bounded worker pool)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Dispatcher                               │
//! │              (one command, one operation)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!               ┌───────▼───────┐
//!               │  MovieStore   │
//!               │   (Mutex)     │
//!               └───────┬───────┘
//!                       │
//!               ┌───────▼───────┐
//!               │ CsvPersister  │
//!               │  (flat file)  │
//!               └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod catalog;
pub mod dispatch;
pub mod network;
pub mod persist;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use catalog::{Movie, MovieStore};
pub use config::Config;
pub use error::{Result, VaultError};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cinevault
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
