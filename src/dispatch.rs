//! Command dispatch
//!
//! Maps a decoded command to exactly one catalog operation and formats the
//! result as response text. Each command is its own atomic unit against the
//! store; no state spans commands.

use std::sync::Arc;

use crate::catalog::MovieStore;
use crate::error::VaultError;
use crate::protocol::{Command, Response};

/// Routes commands to the shared store
pub struct Dispatcher {
    store: Arc<MovieStore>,
}

impl Dispatcher {
    pub fn new(store: Arc<MovieStore>) -> Self {
        Self { store }
    }

    /// Execute a command and format the outcome
    ///
    /// Returns `None` for `Quit`, which produces no response; the session
    /// loop closes the connection instead.
    pub fn dispatch(&self, command: Command) -> Option<Response> {
        let response = match command {
            Command::Quit => return None,
            Command::Register {
                title,
                director,
                year,
                genres,
            } => self
                .store
                .register(title, director, year, genres)
                .map(|id| Response::ok(format!("Movie registered with id {}.", id)))
                .unwrap_or_else(Self::failure),
            Command::AddGenre { id, genre } => self
                .store
                .add_genre(id, genre.clone())
                .map(|_| Response::ok(format!("Genre '{}' added to movie {}.", genre, id)))
                .unwrap_or_else(Self::failure),
            Command::Remove { id } => self
                .store
                .remove(id)
                .map(|_| Response::ok(format!("Movie {} removed.", id)))
                .unwrap_or_else(Self::failure),
            Command::ListIds => Response::ok(self.store.list_ids()),
            Command::ListAll => Response::ok(self.store.list_all()),
            Command::ListById { id } => self
                .store
                .list_by_id(id)
                .map(Response::ok)
                .unwrap_or_else(Self::failure),
            Command::ListByGenre { genre } => Response::ok(self.store.list_by_genre(&genre)),
        };

        Some(response)
    }

    /// Map a store error to a response; the session stays open either way
    fn failure(err: VaultError) -> Response {
        match err {
            VaultError::NotFound { .. } => Response::not_found(err.to_string()),
            _ => Response::error(err.to_string()),
        }
    }
}
