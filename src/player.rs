//! The player core: input routing, recording hooks, and the playback
//! scheduler that turns song events into timed note-on/note-off actions.
//!
//! Everything lives in one explicitly-owned `Player`; collaborators (the
//! tone sink and the display sink) are injected at construction. A
//! front-end loop drives playback by calling `tick` with the current
//! instant. Scheduled actions re-check play/pause state when they fire,
//! not when they are queued: pause or stop may have happened in between,
//! and a stale action must become a safe no-op.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::error::Error;
use crate::keymap;
use crate::note::Note;
use crate::pitch::Transpose;
use crate::recorder::Recorder;
use crate::song::Song;
use crate::synth::ToneSink;
use crate::ui::{Controls, DisplaySink, StatusKind};

/// What a scheduled action does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    NoteOn,
    NoteOff,
}

/// One pending playback action: at this instant, trigger this note.
#[derive(Debug)]
struct Scheduled {
    at: Instant,
    note: Note,
    action: Action,
}

pub struct Player {
    synth: Box<dyn ToneSink>,
    display: Box<dyn DisplaySink>,
    transpose: Transpose,
    recorder: Recorder,
    song: Option<Song>,
    /// Physical keys currently held, for press/release deduplication.
    pressed: HashSet<char>,
    /// Notes currently sounding. A note appears at most once.
    active: HashSet<Note>,
    pending: Vec<Scheduled>,
    playing: bool,
    paused: bool,
    speed: f64,
    origin: Option<Instant>,
    paused_elapsed: Duration,
}

impl Player {
    pub fn new(synth: Box<dyn ToneSink>, display: Box<dyn DisplaySink>) -> Player {
        let mut player = Player {
            synth,
            display,
            transpose: Transpose::new(),
            recorder: Recorder::new(),
            song: None,
            pressed: HashSet::new(),
            active: HashSet::new(),
            pending: Vec::new(),
            playing: false,
            paused: false,
            speed: 1.0,
            origin: None,
            paused_elapsed: Duration::ZERO,
        };
        player.display.status("Ready to play!", StatusKind::Ready);
        player.push_controls();
        player
    }

    // --- input routing ---

    /// Keyboard press. Duplicate presses without an intervening release
    /// (and anything not on the key map) are ignored. Case-insensitive,
    /// so a held Shift cannot split a press/release pair.
    pub fn key_down(&mut self, key: char, now: Instant) {
        let key = key.to_ascii_lowercase();
        if self.pressed.contains(&key) {
            return;
        }
        let Some(note) = keymap::key_to_note(key) else {
            return;
        };
        self.pressed.insert(key);
        self.note_on(note, now);
    }

    pub fn key_up(&mut self, key: char, now: Instant) {
        let key = key.to_ascii_lowercase();
        if !self.pressed.remove(&key) {
            return;
        }
        if let Some(note) = keymap::key_to_note(key) {
            self.note_off(note, now);
        }
    }

    /// Pointer input path: no pressed-key bookkeeping, straight to the
    /// note primitives.
    pub fn pointer_down(&mut self, note: Note, now: Instant) {
        self.note_on(note, now);
    }

    pub fn pointer_up(&mut self, note: Note, now: Instant) {
        self.note_off(note, now);
    }

    // --- note primitives (shared by every input source and playback) ---

    pub fn note_on(&mut self, note: Note, now: Instant) {
        self.display.key_pressed(note, true);
        if self.active.contains(&note) {
            // Re-trigger while sounding is a no-op.
            return;
        }
        let freq = self.transpose.apply(note.frequency());
        self.synth.start(note, freq);
        self.active.insert(note);
        self.recorder.note_on(note, now);
    }

    pub fn note_off(&mut self, note: Note, now: Instant) {
        self.display.key_pressed(note, false);
        if self.active.remove(&note) {
            self.synth.stop(note);
            self.recorder.note_off(note, now);
        }
    }

    // --- pitch ---

    pub fn shift_steps(&mut self, delta: i32) {
        self.transpose.shift_steps(delta);
    }

    pub fn shift_octave(&mut self, delta: i32) {
        self.transpose.shift_octave(delta);
    }

    pub fn reset_steps(&mut self) {
        self.transpose.reset_steps();
    }

    pub fn reset_octave(&mut self) {
        self.transpose.reset_octave();
    }

    pub fn transpose(&self) -> Transpose {
        self.transpose
    }

    // --- recording ---

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn start_recording(&mut self, now: Instant, name: String) {
        if self.recorder.is_recording() {
            return;
        }
        self.recorder.start(now, name);
        self.display.status("Recording...", StatusKind::Recording);
        self.push_controls();
    }

    pub fn stop_recording(&mut self, now: Instant) {
        if !self.recorder.is_recording() {
            return;
        }
        let total_ms = self.recorder.stop(now);
        self.display.status(
            &format!("Recording stopped. Duration: {:.1}s", total_ms / 1000.0),
            StatusKind::Ready,
        );
        self.push_controls();
    }

    /// Pretty-printed JSON of the last finished recording.
    pub fn export_recording(&self) -> Result<String, Error> {
        if self.recorder.is_empty() {
            return Err(Error::EmptyRecording);
        }
        self.recorder.song().to_pretty_json()
    }

    // --- playback ---

    pub fn load_song(&mut self, song: Song) {
        if self.playing {
            self.stop();
        }
        self.display.status(
            &format!("Loaded: {} ({:.1}s)", song.name, song.duration / 1000.0),
            StatusKind::Ready,
        );
        self.song = Some(song);
        self.push_controls();
    }

    pub fn set_speed(&mut self, speed: f64) {
        if !(speed > 0.0) {
            log::warn!("ignoring non-positive playback speed {}", speed);
            return;
        }
        self.speed = speed;
    }

    pub fn is_playing(&self) -> bool {
        self.playing && !self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.playing && self.paused
    }

    pub fn is_stopped(&self) -> bool {
        !self.playing
    }

    /// Start playback of the loaded song, or resume it when paused.
    ///
    /// Resume re-issues the whole schedule against a fresh origin with
    /// `paused_elapsed` as the subtraction term; events whose fire time
    /// has already elapsed are dropped rather than fired late, and any
    /// actions still pending from before the pause stay queued, relying
    /// on the state re-check at fire time.
    pub fn play(&mut self, now: Instant) {
        if self.playing && !self.paused {
            return;
        }
        if self.recorder.is_recording() {
            log::warn!("refusing to start playback while recording");
            return;
        }
        let Some(song) = self.song.as_ref() else {
            return;
        };
        if !self.paused {
            self.paused_elapsed = Duration::ZERO;
        }
        self.playing = true;
        self.paused = false;
        self.origin = Some(now);

        let mut added = Vec::new();
        let mut dropped = 0usize;
        for event in &song.notes {
            let Some(note) = Note::parse(&event.key) else {
                log::debug!("skipping unknown note {:?}", event.key);
                continue;
            };
            let start = Duration::from_secs_f64(event.start_time / 1000.0 / self.speed);
            let length = Duration::from_secs_f64(event.duration / 1000.0 / self.speed);
            let fire_at = match (now + start).checked_sub(self.paused_elapsed) {
                Some(at) if at > now => at,
                _ => {
                    dropped += 1;
                    continue;
                }
            };
            added.push(Scheduled {
                at: fire_at,
                note,
                action: Action::NoteOn,
            });
            added.push(Scheduled {
                at: fire_at + length,
                note,
                action: Action::NoteOff,
            });
        }
        if dropped > 0 {
            log::warn!("{} note events already elapsed, dropped", dropped);
        }
        self.pending.extend(added);
        self.pending.sort_by_key(|s| s.at);

        self.display.status("Playing...", StatusKind::Playing);
        self.push_controls();
    }

    /// Freeze playback. Active tones are force-stopped (without touching
    /// the recorder); pending actions stay queued and decide for
    /// themselves when they fire.
    pub fn pause(&mut self, now: Instant) {
        if !self.playing || self.paused {
            return;
        }
        self.paused = true;
        if let Some(origin) = self.origin {
            self.paused_elapsed += now.saturating_duration_since(origin);
        }
        self.silence_active();
        self.display.status("Paused", StatusKind::Paused);
        self.push_controls();
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.paused = false;
        self.paused_elapsed = Duration::ZERO;
        self.origin = None;
        self.pending.clear();
        self.silence_active();
        self.display.clear_highlights();
        self.display.progress(0.0);
        let text = if self.song.is_some() {
            "Ready to play"
        } else {
            "Load a song to play"
        };
        self.display.status(text, StatusKind::Ready);
        self.push_controls();
    }

    /// Stop every sounding tone, including live-played ones.
    pub fn silence(&mut self) {
        self.silence_active();
        self.synth.stop_all();
    }

    /// Advance playback: fire due actions, then publish progress. Call
    /// this from the front-end loop at display-refresh cadence.
    pub fn tick(&mut self, now: Instant) {
        self.fire_due(now);
        self.report_progress(now);
    }

    fn fire_due(&mut self, now: Instant) {
        let due = self.pending.iter().take_while(|s| s.at <= now).count();
        if due == 0 {
            return;
        }
        let fired: Vec<Scheduled> = self.pending.drain(..due).collect();
        for Scheduled { note, action, .. } in fired {
            match action {
                Action::NoteOn => {
                    if self.playing && !self.paused {
                        self.display.key_upcoming(note, true);
                        self.note_on(note, now);
                    }
                }
                Action::NoteOff => {
                    // Fires even while paused so nothing is left sounding.
                    if self.playing {
                        self.note_off(note, now);
                        self.display.key_upcoming(note, false);
                    }
                }
            }
        }
    }

    fn report_progress(&mut self, now: Instant) {
        if !self.playing || self.paused {
            return;
        }
        let Some(origin) = self.origin else {
            return;
        };
        let Some(song) = self.song.as_ref() else {
            return;
        };
        let elapsed_ms = (now.saturating_duration_since(origin) + self.paused_elapsed)
            .as_secs_f64()
            * 1000.0
            * self.speed;
        let fraction = if song.duration > 0.0 {
            (elapsed_ms / song.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.display.progress(fraction);
        if fraction >= 1.0 {
            self.stop();
            self.display.status("Song finished!", StatusKind::Finished);
        }
    }

    /// Force-stop everything sounding without emitting recorder events.
    fn silence_active(&mut self) {
        for note in self.active.drain() {
            self.synth.stop(note);
            self.display.key_pressed(note, false);
        }
    }

    fn push_controls(&mut self) {
        let controls = Controls {
            record: true,
            save: !self.recorder.is_recording() && !self.recorder.is_empty(),
            play: self.song.is_some() && !(self.playing && !self.paused),
            pause: self.playing && !self.paused,
            stop: self.playing,
        };
        self.display.controls(controls);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song::NoteEvent;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct SynthLog {
        started: Vec<(Note, f64)>,
        stopped: Vec<Note>,
        all_off: usize,
    }

    struct TestSynth(Rc<RefCell<SynthLog>>);

    impl ToneSink for TestSynth {
        fn start(&mut self, note: Note, freq: f64) {
            self.0.borrow_mut().started.push((note, freq));
        }
        fn stop(&mut self, note: Note) {
            self.0.borrow_mut().stopped.push(note);
        }
        fn stop_all(&mut self) {
            self.0.borrow_mut().all_off += 1;
        }
    }

    #[derive(Default)]
    struct DisplayLog {
        statuses: Vec<(String, StatusKind)>,
        progress: Vec<f64>,
        upcoming: Vec<(Note, bool)>,
        controls: Vec<Controls>,
        cleared: usize,
    }

    struct TestDisplay(Rc<RefCell<DisplayLog>>);

    impl DisplaySink for TestDisplay {
        fn key_pressed(&mut self, _note: Note, _on: bool) {}
        fn key_upcoming(&mut self, note: Note, on: bool) {
            self.0.borrow_mut().upcoming.push((note, on));
        }
        fn clear_highlights(&mut self) {
            self.0.borrow_mut().cleared += 1;
        }
        fn status(&mut self, text: &str, kind: StatusKind) {
            self.0.borrow_mut().statuses.push((text.to_string(), kind));
        }
        fn progress(&mut self, fraction: f64) {
            self.0.borrow_mut().progress.push(fraction);
        }
        fn controls(&mut self, controls: Controls) {
            self.0.borrow_mut().controls.push(controls);
        }
    }

    fn player() -> (Player, Rc<RefCell<SynthLog>>, Rc<RefCell<DisplayLog>>) {
        let synth_log = Rc::new(RefCell::new(SynthLog::default()));
        let display_log = Rc::new(RefCell::new(DisplayLog::default()));
        let player = Player::new(
            Box::new(TestSynth(synth_log.clone())),
            Box::new(TestDisplay(display_log.clone())),
        );
        (player, synth_log, display_log)
    }

    fn note(label: &str) -> Note {
        Note::parse(label).unwrap()
    }

    fn event(key: &str, start_time: f64, duration: f64) -> NoteEvent {
        NoteEvent {
            key: key.into(),
            start_time,
            duration,
        }
    }

    fn song(duration: f64, notes: Vec<NoteEvent>) -> Song {
        Song {
            name: "t".into(),
            duration,
            notes,
        }
    }

    #[test]
    fn test_note_on_is_idempotent() {
        let (mut player, synth, _) = player();
        let t0 = Instant::now();
        player.note_on(note("C4"), t0);
        player.note_on(note("C4"), t0 + Duration::from_millis(5));
        assert_eq!(synth.borrow().started.len(), 1);
        assert_eq!(player.active.len(), 1);
    }

    #[test]
    fn test_note_off_unknown_is_noop() {
        let (mut player, synth, _) = player();
        player.note_off(note("C4"), Instant::now());
        assert!(synth.borrow().stopped.is_empty());
    }

    #[test]
    fn test_transpose_applied_to_frequency() {
        let (mut player, synth, _) = player();
        player.shift_steps(12);
        player.note_on(note("A4"), Instant::now());
        let freq = synth.borrow().started[0].1;
        assert!((freq - 880.0).abs() < 0.01);
    }

    #[test]
    fn test_key_router_deduplicates_presses() {
        let (mut player, synth, _) = player();
        let t0 = Instant::now();
        player.key_down('i', t0);
        player.key_down('i', t0 + Duration::from_millis(1));
        assert_eq!(synth.borrow().started.len(), 1);

        player.key_up('i', t0 + Duration::from_millis(10));
        player.key_up('i', t0 + Duration::from_millis(11));
        assert_eq!(synth.borrow().stopped.len(), 1);

        player.key_down('i', t0 + Duration::from_millis(20));
        assert_eq!(synth.borrow().started.len(), 2);
    }

    #[test]
    fn test_shifted_key_release_still_matches() {
        let (mut player, synth, _) = player();
        let t0 = Instant::now();
        player.key_down('i', t0);
        player.key_up('I', t0 + Duration::from_millis(10));
        assert_eq!(synth.borrow().stopped.len(), 1);
        assert!(player.pressed.is_empty());
    }

    #[test]
    fn test_unmapped_key_ignored() {
        let (mut player, synth, _) = player();
        player.key_down('a', Instant::now());
        assert!(synth.borrow().started.is_empty());
        assert!(player.pressed.is_empty());
    }

    #[test]
    fn test_pointer_path_bypasses_pressed_set() {
        let (mut player, synth, _) = player();
        let t0 = Instant::now();
        player.pointer_down(note("C4"), t0);
        assert!(player.pressed.is_empty());
        player.pointer_up(note("C4"), t0 + Duration::from_millis(10));
        assert_eq!(synth.borrow().stopped.len(), 1);
    }

    #[test]
    fn test_double_speed_halves_fire_offsets() {
        let t0 = Instant::now();
        let offsets = |speed: f64| -> Vec<Duration> {
            let (mut player, _, _) = player();
            player.load_song(song(1000.0, vec![event("C4", 400.0, 200.0)]));
            player.set_speed(speed);
            player.play(t0);
            player.pending.iter().map(|s| s.at - t0).collect()
        };
        let normal = offsets(1.0);
        let double = offsets(2.0);
        assert_eq!(normal.len(), 2);
        assert_eq!(double.len(), 2);
        assert_eq!(normal[0], Duration::from_millis(400));
        assert_eq!(double[0], Duration::from_millis(200));
        assert_eq!(normal[1], Duration::from_millis(600));
        assert_eq!(double[1], Duration::from_millis(300));
    }

    #[test]
    fn test_note_at_origin_is_dropped() {
        let (mut player, synth, _) = player();
        let t0 = Instant::now();
        player.load_song(song(1000.0, vec![
            event("C4", 0.0, 100.0),
            event("D4", 50.0, 100.0),
        ]));
        player.play(t0);
        // Only the strictly-future note is scheduled.
        assert_eq!(player.pending.len(), 2);
        player.tick(t0 + Duration::from_millis(60));
        assert_eq!(synth.borrow().started.len(), 1);
        assert_eq!(synth.borrow().started[0].0, note("D4"));
    }

    #[test]
    fn test_unknown_song_key_skipped() {
        let (mut player, synth, _) = player();
        let t0 = Instant::now();
        player.load_song(song(500.0, vec![event("Z9", 100.0, 100.0)]));
        player.play(t0);
        assert!(player.pending.is_empty());
        player.tick(t0 + Duration::from_millis(200));
        assert!(synth.borrow().started.is_empty());
    }

    #[test]
    fn test_play_requires_song() {
        let (mut player, _, _) = player();
        player.play(Instant::now());
        assert!(player.is_stopped());
    }

    #[test]
    fn test_play_refused_while_recording() {
        let (mut player, _, _) = player();
        let t0 = Instant::now();
        player.load_song(song(1000.0, vec![event("C4", 100.0, 100.0)]));
        player.start_recording(t0, "take".into());
        player.play(t0);
        assert!(player.is_stopped());
        assert!(player.pending.is_empty());
    }

    #[test]
    fn test_pause_silences_and_freezes() {
        let (mut player, synth, _) = player();
        let t0 = Instant::now();
        let at = |ms: u64| t0 + Duration::from_millis(ms);

        player.load_song(song(1000.0, vec![event("C4", 100.0, 400.0)]));
        player.play(t0);
        player.tick(at(150));
        assert_eq!(synth.borrow().started.len(), 1);
        assert!(player.active.contains(&note("C4")));

        player.pause(at(200));
        assert!(player.is_paused());
        assert_eq!(player.paused_elapsed, Duration::from_millis(200));
        assert!(player.active.is_empty());
        assert_eq!(synth.borrow().stopped, vec![note("C4")]);
    }

    #[test]
    fn test_note_on_suppressed_while_paused_note_off_fires() {
        let (mut player, synth, display) = player();
        let t0 = Instant::now();
        let at = |ms: u64| t0 + Duration::from_millis(ms);

        player.load_song(song(2000.0, vec![
            event("C4", 100.0, 300.0), // off due at 400
            event("E4", 500.0, 100.0), // on due at 500
        ]));
        player.play(t0);
        player.tick(at(150));
        player.pause(at(200));

        // Note-offs fire during the pause for cleanup; the E4 note-on is
        // suppressed by the paused check.
        player.tick(at(600));
        assert!(player.pending.is_empty());
        assert_eq!(synth.borrow().started.len(), 1);
        let upcoming = display.borrow().upcoming.clone();
        assert_eq!(
            upcoming,
            vec![
                (note("C4"), true),
                (note("C4"), false),
                (note("E4"), false),
            ]
        );
    }

    #[test]
    fn test_resume_rebases_without_refiring() {
        let (mut player, synth, _) = player();
        let t0 = Instant::now();
        let at = |ms: u64| t0 + Duration::from_millis(ms);

        player.load_song(song(2000.0, vec![
            event("C4", 100.0, 100.0),
            event("E4", 500.0, 100.0),
        ]));
        player.play(t0);
        player.tick(at(150)); // C4 fires
        player.tick(at(250)); // C4 releases
        player.pause(at(300));
        // The front-end keeps ticking while paused: the stale E4 pair
        // from the first schedule fires into the paused guard and is
        // consumed without sounding.
        player.tick(at(700));
        assert_eq!(synth.borrow().started.len(), 1);

        player.play(at(1000)); // resume
        assert!(player.is_playing());
        assert_eq!(player.paused_elapsed, Duration::from_millis(300));

        // C4 (offset 100ms, already elapsed) is dropped; E4 is re-based
        // to origin + 500 - 300 = t0 + 1200ms.
        let on_times: Vec<Duration> = player
            .pending
            .iter()
            .filter(|s| s.action == Action::NoteOn)
            .map(|s| s.at - t0)
            .collect();
        assert_eq!(on_times, vec![Duration::from_millis(1200)]);

        player.tick(at(1250));
        let started: Vec<Note> = synth.borrow().started.iter().map(|&(n, _)| n).collect();
        assert_eq!(started, vec![note("C4"), note("E4")]);
    }

    #[test]
    fn test_pause_accumulates_across_cycles() {
        let (mut player, _, _) = player();
        let t0 = Instant::now();
        let at = |ms: u64| t0 + Duration::from_millis(ms);

        player.load_song(song(10_000.0, vec![]));
        player.play(t0);
        player.pause(at(300));
        player.play(at(1000));
        player.pause(at(1200));
        // 300ms before the first pause + 200ms after resume.
        assert_eq!(player.paused_elapsed, Duration::from_millis(500));
    }

    #[test]
    fn test_stop_clears_everything() {
        let (mut player, synth, display) = player();
        let t0 = Instant::now();
        player.load_song(song(1000.0, vec![event("C4", 100.0, 400.0)]));
        player.play(t0);
        player.tick(t0 + Duration::from_millis(150));
        player.stop();

        assert!(player.is_stopped());
        assert!(player.pending.is_empty());
        assert!(player.active.is_empty());
        assert_eq!(synth.borrow().stopped.len(), 1);
        assert!(display.borrow().cleared >= 1);
        assert_eq!(display.borrow().progress.last(), Some(&0.0));
    }

    #[test]
    fn test_playback_does_not_record() {
        let (mut player, _, _) = player();
        let t0 = Instant::now();
        player.load_song(song(1000.0, vec![event("C4", 100.0, 100.0)]));
        player.play(t0);
        player.tick(t0 + Duration::from_millis(150));
        player.tick(t0 + Duration::from_millis(250));
        assert!(player.recorder.is_empty());
    }

    #[test]
    fn test_recording_round_trip_through_player() {
        let (mut player, _, _) = player();
        let t0 = Instant::now();
        let at = |ms: u64| t0 + Duration::from_millis(ms);

        assert!(matches!(
            player.export_recording(),
            Err(Error::EmptyRecording)
        ));

        player.start_recording(t0, "take".into());
        player.key_down('q', at(0));
        player.key_up('q', at(500));
        player.stop_recording(at(500));

        let json = player.export_recording().unwrap();
        let recorded = Song::from_json(&json).unwrap();
        assert_eq!(recorded.duration, 500.0);
        assert_eq!(recorded.notes.len(), 1);
        assert_eq!(recorded.notes[0].key, "C3");
    }

    #[test]
    fn test_end_to_end_completion() {
        let (mut player, _, display) = player();
        let t0 = Instant::now();
        let at = |ms: u64| t0 + Duration::from_millis(ms);

        player.load_song(song(1000.0, vec![event("C4", 0.0, 1000.0)]));
        player.play(t0);
        player.tick(at(500));
        assert!((display.borrow().progress.last().unwrap() - 0.5).abs() < 0.01);

        player.tick(at(1000));
        assert!(player.is_stopped());
        assert!(display.borrow().progress.contains(&1.0));
        let (text, kind) = display.borrow().statuses.last().unwrap().clone();
        assert_eq!(text, "Song finished!");
        assert_eq!(kind, StatusKind::Finished);
    }

    #[test]
    fn test_progress_frozen_while_paused() {
        let (mut player, _, display) = player();
        let t0 = Instant::now();
        let at = |ms: u64| t0 + Duration::from_millis(ms);

        player.load_song(song(1000.0, vec![]));
        player.play(t0);
        player.pause(at(200));
        let count = display.borrow().progress.len();
        player.tick(at(600));
        assert_eq!(display.borrow().progress.len(), count);
    }

    #[test]
    fn test_controls_follow_state() {
        let (mut player, _, display) = player();
        let t0 = Instant::now();

        let last = |d: &Rc<RefCell<DisplayLog>>| *d.borrow().controls.last().unwrap();

        assert!(!last(&display).play);

        player.load_song(song(1000.0, vec![]));
        let c = last(&display);
        assert!(c.play && !c.pause && !c.stop);

        player.play(t0);
        let c = last(&display);
        assert!(!c.play && c.pause && c.stop);

        player.pause(t0 + Duration::from_millis(100));
        let c = last(&display);
        assert!(c.play && !c.pause && c.stop);

        player.stop();
        let c = last(&display);
        assert!(c.play && !c.pause && !c.stop);
    }

    #[test]
    fn test_silence_stops_everything_sounding() {
        let (mut player, synth, _) = player();
        player.note_on(note("C4"), Instant::now());
        player.silence();
        assert!(player.active.is_empty());
        assert_eq!(synth.borrow().all_off, 1);
    }

    #[test]
    fn test_no_pause_from_stopped() {
        let (mut player, _, _) = player();
        player.pause(Instant::now());
        assert!(player.is_stopped());
        assert_eq!(player.paused_elapsed, Duration::ZERO);
    }
}
