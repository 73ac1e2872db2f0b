//! Song files: the JSON format shared by recordings and loaded songs.
//!
//! A song is `{ "name": ..., "duration": ms, "notes": [...] }` where each
//! note carries a key label, a start offset from the song origin, and a
//! duration, all in milliseconds. Note order is insertion order, not
//! necessarily sorted by start time.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One played note. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    /// Key label ("C3".."E5"). Labels outside the piano survive loading
    /// and are skipped at trigger time.
    pub key: String,
    /// Offset from the song origin, in ms.
    pub start_time: f64,
    /// How long the key was held, in ms.
    pub duration: f64,
}

/// A named, finite collection of note events with a total span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub name: String,
    /// Total span in ms.
    pub duration: f64,
    pub notes: Vec<NoteEvent>,
}

impl Song {
    /// Parse and validate a song. Any structural violation rejects the
    /// whole payload; nothing is partially loaded.
    pub fn from_json(text: &str) -> Result<Song, Error> {
        let song: Song =
            serde_json::from_str(text).map_err(|e| Error::InvalidFormat(e.to_string()))?;
        song.validate()?;
        Ok(song)
    }

    pub fn load(path: &Path) -> Result<Song, Error> {
        let text = fs::read_to_string(path)?;
        Song::from_json(&text)
    }

    /// Human-readable JSON, the shape recordings are saved in.
    pub fn to_pretty_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), Error> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(Error::InvalidFormat(format!(
                "duration must be a non-negative number, got {}",
                self.duration
            )));
        }
        for (index, note) in self.notes.iter().enumerate() {
            if !note.start_time.is_finite() || note.start_time < 0.0 {
                return Err(Error::InvalidFormat(format!(
                    "note {}: startTime must be a non-negative number",
                    index
                )));
            }
            if !note.duration.is_finite() || note.duration < 0.0 {
                return Err(Error::InvalidFormat(format!(
                    "note {}: duration must be a non-negative number",
                    index
                )));
            }
        }
        Ok(())
    }
}
