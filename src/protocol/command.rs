//! Command definitions
//!
//! Represents commands from clients.

/// Command codes as they appear on the wire
///
/// The numbering matches the legacy menu options, so existing clients keep
/// their mental model: 0 quits, 1-7 select an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandCode {
    Quit = 0,
    Register = 1,
    AddGenre = 2,
    Remove = 3,
    ListIds = 4,
    ListAll = 5,
    ListById = 6,
    ListByGenre = 7,
}

impl CommandCode {
    /// Map a wire byte to a code, `None` for unrecognized bytes
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(CommandCode::Quit),
            1 => Some(CommandCode::Register),
            2 => Some(CommandCode::AddGenre),
            3 => Some(CommandCode::Remove),
            4 => Some(CommandCode::ListIds),
            5 => Some(CommandCode::ListAll),
            6 => Some(CommandCode::ListById),
            7 => Some(CommandCode::ListByGenre),
            _ => None,
        }
    }

    /// Number of payload fields this command carries
    pub fn field_count(self) -> usize {
        match self {
            CommandCode::Quit | CommandCode::ListIds | CommandCode::ListAll => 0,
            CommandCode::Remove | CommandCode::ListById | CommandCode::ListByGenre => 1,
            CommandCode::AddGenre => 2,
            CommandCode::Register => 4,
        }
    }
}

/// A parsed command
#[derive(Debug, Clone)]
pub enum Command {
    /// End the session
    Quit,

    /// Register a new movie
    Register {
        title: String,
        director: String,
        year: u32,
        genres: Vec<String>,
    },

    /// Append a genre to an existing movie
    AddGenre { id: u64, genre: String },

    /// Remove a movie
    Remove { id: u64 },

    /// List `id - title` for every movie
    ListIds,

    /// List full info for every movie
    ListAll,

    /// Show one movie
    ListById { id: u64 },

    /// List movies whose genre text contains the query
    ListByGenre { genre: String },
}

impl Command {
    /// Get the wire code for this command
    pub fn code(&self) -> CommandCode {
        match self {
            Command::Quit => CommandCode::Quit,
            Command::Register { .. } => CommandCode::Register,
            Command::AddGenre { .. } => CommandCode::AddGenre,
            Command::Remove { .. } => CommandCode::Remove,
            Command::ListIds => CommandCode::ListIds,
            Command::ListAll => CommandCode::ListAll,
            Command::ListById { .. } => CommandCode::ListById,
            Command::ListByGenre { .. } => CommandCode::ListByGenre,
        }
    }
}
