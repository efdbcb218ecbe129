//! CSV persister
//!
//! Stateless beyond the file path. `save` rewrites the full catalog through
//! a sibling temp file and renames it into place, so the durable file is
//! never left truncated by a crash mid-write.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::catalog::{Movie, GENRE_SEPARATOR};
use crate::error::Result;

/// Separator between record fields on a persisted line
pub const FIELD_SEPARATOR: char = ',';

/// Persists the catalog to a flat text file
pub struct CsvPersister {
    /// The durable file
    path: PathBuf,
}

impl CsvPersister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write the entire collection to the durable file
    ///
    /// The rewrite goes to `<path>.tmp`, is synced, and is renamed over the
    /// durable file. Callers hold the store lock across this, so the file
    /// always matches the in-memory state they just produced.
    pub fn save(&self, movies: &[Movie]) -> Result<()> {
        let tmp_path = self.temp_path();

        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);

            for movie in movies {
                writeln!(writer, "{}", Self::format_line(movie))?;
            }

            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Read the collection back from the durable file
    ///
    /// A missing file is not an error: it yields an empty catalog. Lines
    /// that do not parse are skipped with a warning instead of aborting
    /// startup.
    pub fn load(&self) -> Result<Vec<Movie>> {
        if !self.path.exists() {
            tracing::info!(
                file = %self.path.display(),
                "data file not found, starting with an empty catalog"
            );
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut movies = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            match Self::parse_line(&line) {
                Some(movie) => movies.push(movie),
                None => {
                    tracing::warn!(
                        file = %self.path.display(),
                        line = lineno + 1,
                        "skipping unparseable catalog line"
                    );
                }
            }
        }

        Ok(movies)
    }

    /// Path of the durable file
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Sibling temp file used for the atomic rewrite
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// `id,title,director,year,genres` with `;` between genres
    fn format_line(movie: &Movie) -> String {
        format!(
            "{id}{s}{title}{s}{director}{s}{year}{s}{genres}",
            id = movie.id,
            title = movie.title,
            director = movie.director,
            year = movie.year,
            genres = movie.genres_joined(),
            s = FIELD_SEPARATOR,
        )
    }

    /// Parse one persisted line; `None` if any field is missing or numeric
    /// fields do not parse
    fn parse_line(line: &str) -> Option<Movie> {
        let mut fields = line.splitn(5, FIELD_SEPARATOR);

        let id = fields.next()?.parse().ok()?;
        let title = fields.next()?.to_string();
        let director = fields.next()?.to_string();
        let year = fields.next()?.parse().ok()?;
        let genres_field = fields.next()?;

        let genres = if genres_field.is_empty() {
            Vec::new()
        } else {
            genres_field
                .split(GENRE_SEPARATOR)
                .map(str::to_string)
                .collect()
        };

        Some(Movie {
            id,
            title,
            director,
            year,
            genres,
        })
    }
}
