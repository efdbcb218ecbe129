//! Movie record definition and text rendering.

use super::GENRE_SEPARATOR;

/// A single movie record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    /// Unique, server-assigned identifier
    pub id: u64,

    /// Title
    pub title: String,

    /// Director name
    pub director: String,

    /// Release year
    pub year: u32,

    /// Genres, order-preserving (duplicates are not deduplicated)
    pub genres: Vec<String>,
}

impl Movie {
    pub fn new(
        id: u64,
        title: impl Into<String>,
        director: impl Into<String>,
        year: u32,
        genres: Vec<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            director: director.into(),
            year,
            genres,
        }
    }

    /// Genres joined with the persisted separator, e.g. `"action;sciFi"`
    pub fn genres_joined(&self) -> String {
        self.genres.join(&GENRE_SEPARATOR.to_string())
    }

    /// One-line rendering used by the listing operations
    pub fn render_line(&self) -> String {
        format!(
            "ID: {} | Title: {} | Director: {} | Year: {} | Genres: {}",
            self.id,
            self.title,
            self.director,
            self.year,
            self.genres_joined()
        )
    }

    /// Multi-line rendering used by the single-record lookup
    pub fn render_detail(&self) -> String {
        format!(
            "ID: {}\nTitle: {}\nDirector: {}\nYear: {}\nGenres: {}",
            self.id,
            self.title,
            self.director,
            self.year,
            self.genres_joined()
        )
    }
}
