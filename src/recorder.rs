//! Capture of live performances into song events.

use std::collections::HashMap;
use std::time::Instant;

use crate::note::Note;
use crate::song::{NoteEvent, Song};

/// Records note on/off timing relative to a recording origin. A note that
/// is pressed again before release overwrites its earlier start; a note
/// still held when recording stops ends exactly at stop time.
pub struct Recorder {
    recording: bool,
    origin: Option<Instant>,
    open: HashMap<Note, f64>,
    song: Song,
}

impl Recorder {
    pub fn new() -> Recorder {
        Recorder {
            recording: false,
            origin: None,
            open: HashMap::new(),
            song: Song {
                name: String::new(),
                duration: 0.0,
                notes: Vec::new(),
            },
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Whether any events have been captured so far.
    pub fn is_empty(&self) -> bool {
        self.song.notes.is_empty()
    }

    /// The recording, finalized by `stop` (or in progress).
    pub fn song(&self) -> &Song {
        &self.song
    }

    /// Begin a fresh recording, discarding any previous one.
    pub fn start(&mut self, now: Instant, name: String) {
        self.recording = true;
        self.origin = Some(now);
        self.open.clear();
        self.song = Song {
            name,
            duration: 0.0,
            notes: Vec::new(),
        };
    }

    pub fn note_on(&mut self, note: Note, now: Instant) {
        if !self.recording {
            return;
        }
        let at = self.offset_ms(now);
        self.open.insert(note, at);
    }

    pub fn note_off(&mut self, note: Note, now: Instant) {
        if !self.recording {
            return;
        }
        if let Some(start) = self.open.remove(&note) {
            let end = self.offset_ms(now);
            self.song.notes.push(NoteEvent {
                key: note.to_string(),
                start_time: start,
                duration: end - start,
            });
        }
    }

    /// Finalize: stamp the total duration and close every still-open
    /// note at stop time. Returns the total duration in ms.
    pub fn stop(&mut self, now: Instant) -> f64 {
        if !self.recording {
            return self.song.duration;
        }
        self.recording = false;
        let total = self.offset_ms(now);
        self.song.duration = total;
        for (note, start) in self.open.drain() {
            self.song.notes.push(NoteEvent {
                key: note.to_string(),
                start_time: start,
                duration: total - start,
            });
        }
        total
    }

    fn offset_ms(&self, now: Instant) -> f64 {
        match self.origin {
            Some(origin) => now.saturating_duration_since(origin).as_secs_f64() * 1000.0,
            None => 0.0,
        }
    }
}
