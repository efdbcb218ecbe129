//! Persistence Module
//!
//! Flat-file durability for the catalog.
//!
//! ## Responsibilities
//! - Rewrite the whole collection after every mutation
//! - Reload the collection at startup (missing file = empty catalog)
//! - Survive a crash mid-rewrite (temp file + atomic rename)
//!
//! ## File Format
//! One record per line: `id,title,director,year,genres`, genres themselves
//! `;`-separated. No quoting or escaping: a `,` or `;` inside a field value
//! corrupts the format. Documented limitation, kept for compatibility with
//! existing catalog files.

mod csv;

pub use csv::CsvPersister;
