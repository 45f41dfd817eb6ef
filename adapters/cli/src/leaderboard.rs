//! Persistent run records kept in a TOML file beside the binary.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Records kept after the table is trimmed.
const MAX_ENTRIES: usize = 50;

/// One finished run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Entry {
    /// Name the player asked to be recorded under.
    pub(crate) player: String,
    /// Whole seconds of play time, pauses excluded.
    pub(crate) seconds: u64,
    /// Highest level index reached during the run.
    pub(crate) level: u32,
}

/// Ordered collection of run records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Leaderboard {
    #[serde(default)]
    entries: Vec<Entry>,
}

/// Errors surfaced while loading or saving the leaderboard file.
#[derive(Debug, Error)]
pub(crate) enum LeaderboardError {
    /// The file exists but could not be read or written.
    #[error("failed to access leaderboard file {path}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The file was read but is not valid leaderboard TOML.
    #[error("failed to parse leaderboard file {path}")]
    Parse {
        /// Path that failed to parse.
        path: String,
        /// Underlying TOML failure.
        source: toml::de::Error,
    },
}

impl Leaderboard {
    /// Loads the table, starting empty when the file does not exist yet.
    pub(crate) fn load(path: &Path) -> Result<Self, LeaderboardError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| LeaderboardError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| LeaderboardError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Inserts a record, re-sorts the table, and trims it to its cap.
    pub(crate) fn record(&mut self, entry: Entry) {
        self.entries.push(entry);
        self.entries
            .sort_by(|a, b| a.seconds.cmp(&b.seconds).then(b.level.cmp(&a.level)));
        self.entries.truncate(MAX_ENTRIES);
    }

    /// Writes the table back to disk.
    pub(crate) fn save(&self, path: &Path) -> Result<(), LeaderboardError> {
        let contents =
            toml::to_string_pretty(self).expect("leaderboard serialization never fails");
        fs::write(path, contents).map_err(|source| LeaderboardError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Records in display order.
    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }
}
