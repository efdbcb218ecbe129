//! Catalog Module
//!
//! The in-memory movie collection and its invariants.
//!
//! ## Responsibilities
//! - Own the shared collection behind a single exclusive lock
//! - Assign ids (max live id + 1) and keep them unique
//! - Trigger a durable rewrite after every mutation
//!
//! ## Concurrency Model
//! One `parking_lot::Mutex` serializes every catalog operation, reads
//! included. The persister write happens inside the critical section, so a
//! mutation is not observable by other sessions until it is durable.

mod movie;
mod store;

pub use movie::Movie;
pub use store::MovieStore;

/// Separator between genres inside the persisted genre field
pub const GENRE_SEPARATOR: char = ';';
