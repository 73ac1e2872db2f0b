//! Display-surface interface. The player core reports state changes
//! through `DisplaySink` instead of driving any particular renderer;
//! front-ends decide what the events look like.

use std::io::{self, Write};

use crate::note::Note;

/// Category attached to a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Ready,
    Recording,
    Playing,
    Paused,
    Finished,
}

/// Which controls are currently meaningful, derived purely from player
/// state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub record: bool,
    pub save: bool,
    pub play: bool,
    pub pause: bool,
    pub stop: bool,
}

pub trait DisplaySink {
    /// A key started or stopped sounding.
    fn key_pressed(&mut self, note: Note, on: bool);
    /// Playback highlight for a scheduled note.
    fn key_upcoming(&mut self, note: Note, on: bool);
    /// Drop every pressed/upcoming highlight at once.
    fn clear_highlights(&mut self);
    fn status(&mut self, text: &str, kind: StatusKind);
    /// Playback position as a fraction in [0, 1].
    fn progress(&mut self, fraction: f64);
    fn controls(&mut self, controls: Controls);
}

/// Console sink for the `play` subcommand: status messages on their own
/// lines, progress as a single rewritten percentage line.
pub struct ConsoleSink {
    last_percent: i64,
}

impl ConsoleSink {
    pub fn new() -> ConsoleSink {
        ConsoleSink { last_percent: -1 }
    }
}

impl DisplaySink for ConsoleSink {
    fn key_pressed(&mut self, _note: Note, _on: bool) {}

    fn key_upcoming(&mut self, _note: Note, _on: bool) {}

    fn clear_highlights(&mut self) {}

    fn status(&mut self, text: &str, kind: StatusKind) {
        // Ready-kind chatter (loaded/stopped notices) is covered by the
        // subcommand's own header line.
        if kind == StatusKind::Ready {
            return;
        }
        // Explicit \r\n: the playback loop runs with the terminal in raw
        // mode, where a bare newline does not return the carriage.
        print!("\r\x1b[2K{}\r\n", text);
        let _ = io::stdout().flush();
    }

    fn progress(&mut self, fraction: f64) {
        let percent = (fraction * 100.0).round() as i64;
        if percent == self.last_percent {
            return;
        }
        self.last_percent = percent;
        print!("\r  {:3}%", percent);
        let _ = io::stdout().flush();
    }

    fn controls(&mut self, _controls: Controls) {}
}
