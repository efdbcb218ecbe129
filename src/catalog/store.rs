//! MovieStore implementation
//!
//! Exclusive owner of the movie collection. Every operation takes the store
//! lock; mutating operations rewrite the durable file before releasing it.

use std::path::Path;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{Result, VaultError};
use crate::persist::CsvPersister;

use super::Movie;

/// The shared movie collection
///
/// Insertion-ordered `Vec` behind one Mutex. Ids are unique within the live
/// set; a new id is always `max(live ids) + 1`, so removing the record that
/// holds the maximum id makes that id assignable again. Existing persisted
/// catalogs depend on that reuse, so it is kept as-is.
pub struct MovieStore {
    /// The collection. Never handed out by reference; all access goes
    /// through the methods below.
    movies: Mutex<Vec<Movie>>,

    /// Durable-file collaborator
    persister: CsvPersister,

    /// Capacity cap (register fails beyond this)
    max_records: usize,
}

impl MovieStore {
    /// Open the store, loading any existing catalog from the data file
    pub fn open(config: &Config) -> Result<Self> {
        let persister = CsvPersister::new(&config.data_file);
        let movies = persister.load()?;

        tracing::info!(
            count = movies.len(),
            file = %config.data_file.display(),
            "catalog loaded"
        );

        Ok(Self {
            movies: Mutex::new(movies),
            persister,
            max_records: config.max_records,
        })
    }

    /// Open with a data file path and default limits (convenience method)
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_file(path).build();
        Self::open(&config)
    }

    /// Register a new movie and return its assigned id
    pub fn register(
        &self,
        title: String,
        director: String,
        year: u32,
        genres: Vec<String>,
    ) -> Result<u64> {
        let mut movies = self.movies.lock();

        if movies.len() >= self.max_records {
            return Err(VaultError::CapacityExceeded {
                cap: self.max_records,
            });
        }

        let id = Self::next_id(&movies);
        movies.push(Movie::new(id, title, director, year, genres));
        self.persister.save(&movies)?;

        Ok(id)
    }

    /// Append a genre to an existing movie
    ///
    /// The existing genre list is extended, never replaced.
    pub fn add_genre(&self, id: u64, genre: String) -> Result<()> {
        let mut movies = self.movies.lock();

        let movie = movies
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(VaultError::NotFound { id })?;

        movie.genres.push(genre);
        self.persister.save(&movies)?;

        Ok(())
    }

    /// Remove a movie by id
    ///
    /// Swap-with-last removal; the order of the remaining records changes.
    pub fn remove(&self, id: u64) -> Result<()> {
        let mut movies = self.movies.lock();

        let index = movies
            .iter()
            .position(|m| m.id == id)
            .ok_or(VaultError::NotFound { id })?;

        movies.swap_remove(index);
        self.persister.save(&movies)?;

        Ok(())
    }

    /// One `id - title` line per movie, insertion order
    pub fn list_ids(&self) -> String {
        let movies = self.movies.lock();

        if movies.is_empty() {
            return "No movies registered.".to_string();
        }

        movies
            .iter()
            .map(|m| format!("{} - {}", m.id, m.title))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One multi-field line per movie
    pub fn list_all(&self) -> String {
        let movies = self.movies.lock();

        if movies.is_empty() {
            return "No movies registered.".to_string();
        }

        movies
            .iter()
            .map(Movie::render_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Full rendering of a single movie
    pub fn list_by_id(&self, id: u64) -> Result<String> {
        let movies = self.movies.lock();

        movies
            .iter()
            .find(|m| m.id == id)
            .map(Movie::render_detail)
            .ok_or(VaultError::NotFound { id })
    }

    /// All movies whose joined genre text contains `genre` as a substring
    ///
    /// Substring containment, not token equality: `"act"` matches a movie
    /// whose genre list joins to `"action"`. Kept for compatibility with
    /// existing clients.
    pub fn list_by_genre(&self, genre: &str) -> String {
        let movies = self.movies.lock();

        let matches: Vec<String> = movies
            .iter()
            .filter(|m| m.genres_joined().contains(genre))
            .map(Movie::render_line)
            .collect();

        if matches.is_empty() {
            return "No movies found for that genre.".to_string();
        }

        matches.join("\n")
    }

    /// Number of movies currently in the catalog
    pub fn len(&self) -> usize {
        self.movies.lock().len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.movies.lock().is_empty()
    }

    /// New id = max live id + 1 (1 for an empty catalog)
    fn next_id(movies: &[Movie]) -> u64 {
        movies.iter().map(|m| m.id).max().unwrap_or(0) + 1
    }
}
