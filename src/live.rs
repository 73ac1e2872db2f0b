//! Interactive live piano mode: play notes from the keyboard or mouse,
//! record takes, and save them as song files.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::sync::mpsc as std_mpsc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
    PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};

use crate::error::Error;
use crate::keymap;
use crate::note::Note;
use crate::pitch::Transpose;
use crate::player::Player;
use crate::synth::AudioEngine;
use crate::ui::{Controls, DisplaySink, StatusKind};

// 1-based screen coordinates of the piano strip and the info lines.
const STRIP_ROW: u16 = 5;
const STRIP_COL: u16 = 5;
const SHIFT_ROW: u16 = 10;
const STATUS_ROW: u16 = 11;
const MESSAGE_ROW: u16 = 12;

/// Run the interactive live piano mode
pub fn run() -> Result<(), Error> {
    let engine = AudioEngine::new()?;

    let mut stdout = io::stdout();

    // Enter raw mode
    terminal::enable_raw_mode()
        .map_err(|e| Error::Terminal(format!("failed to enable raw mode: {}", e)))?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .map_err(|e| Error::Terminal(format!("alternate screen: {}", e)))?;

    // Enable keyboard enhancement for key release detection.
    // On macOS, the terminal may accept the enhancement flag but not
    // actually send release events, so we disable it and use the
    // fallback timer.
    let has_key_release = if cfg!(target_os = "macos") {
        false
    } else {
        queue!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok()
            && stdout.flush().is_ok()
    };

    print_banner(&mut stdout);

    let mut player = Player::new(Box::new(engine), Box::new(TermSink::new()));
    draw_shift_line(&mut stdout, player.transpose());

    let result = event_loop(&mut player, &mut stdout, has_key_release);

    // Restore terminal
    player.silence();
    std::thread::sleep(Duration::from_millis(20));

    if has_key_release {
        let _ = execute!(
            stdout,
            crossterm::event::PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
    } else {
        let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
    }
    let _ = terminal::disable_raw_mode();

    result
}

fn event_loop(
    player: &mut Player,
    stdout: &mut io::Stdout,
    has_key_release: bool,
) -> Result<(), Error> {
    // For the fallback path: a channel that receives key chars from
    // timer threads so the main loop can send note-off at the right time.
    let (fallback_tx, fallback_rx) = std_mpsc::channel::<char>();
    let mut mouse_note: Option<Note> = None;

    loop {
        // Drain any fallback note-off messages from timer threads
        if !has_key_release {
            while let Ok(key) = fallback_rx.try_recv() {
                player.key_up(key, Instant::now());
            }
        }

        if !event::poll(Duration::from_millis(50))
            .map_err(|e| Error::Terminal(format!("event poll error: {}", e)))?
        {
            continue;
        }

        let ev = event::read().map_err(|e| Error::Terminal(format!("event read error: {}", e)))?;

        match ev {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => match code {
                KeyCode::Esc => return Ok(()),

                KeyCode::Enter => save_recording(player, stdout),

                KeyCode::Backspace => {
                    player.reset_steps();
                    player.reset_octave();
                    draw_shift_line(stdout, player.transpose());
                }

                KeyCode::Char(' ') => toggle_recording(player),

                KeyCode::Char('-') => {
                    player.shift_steps(-1);
                    draw_shift_line(stdout, player.transpose());
                }
                KeyCode::Char('=') => {
                    player.shift_steps(1);
                    draw_shift_line(stdout, player.transpose());
                }
                KeyCode::Char('[') => {
                    player.shift_octave(-1);
                    draw_shift_line(stdout, player.transpose());
                }
                KeyCode::Char(']') => {
                    player.shift_octave(1);
                    draw_shift_line(stdout, player.transpose());
                }

                KeyCode::Char(c) => {
                    let c = c.to_ascii_lowercase();
                    if keymap::key_to_note(c).is_some() {
                        let now = Instant::now();

                        // Fallback: no key release support — stop the
                        // previous cycle before starting a new one
                        if !has_key_release {
                            player.key_up(c, now);
                        }

                        player.key_down(c, now);

                        // Fallback: no key release support — auto-off
                        // after 300ms
                        if !has_key_release {
                            let tx = fallback_tx.clone();
                            std::thread::spawn(move || {
                                std::thread::sleep(Duration::from_millis(300));
                                let _ = tx.send(c);
                            });
                        }
                    }
                }

                _ => {}
            },

            Event::Key(KeyEvent {
                code: KeyCode::Char(c),
                kind: KeyEventKind::Release,
                ..
            }) => {
                player.key_up(c, Instant::now());
            }

            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                ..
            }) => {
                if let Some(note) = strip_note_at(column, row) {
                    mouse_note = Some(note);
                    player.pointer_down(note, Instant::now());
                }
            }

            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Up(MouseButton::Left),
                ..
            }) => {
                if let Some(note) = mouse_note.take() {
                    player.pointer_up(note, Instant::now());
                }
            }

            _ => {}
        }
    }
}

fn toggle_recording(player: &mut Player) {
    let now = Instant::now();
    if player.is_recording() {
        player.stop_recording(now);
    } else {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        player.start_recording(now, format!("Recording {}", stamp));
    }
}

fn save_recording(player: &Player, stdout: &mut io::Stdout) {
    match player.export_recording() {
        Ok(json) => {
            let stamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis();
            let path = format!("piano-recording-{}.json", stamp);
            match fs::write(&path, json) {
                Ok(()) => show_message(stdout, &format!("Saved {}", path)),
                Err(e) => show_message(stdout, &format!("Save failed: {}", e)),
            }
        }
        Err(e) => show_message(stdout, &format!("{}", e)),
    }
}

/// Which piano key a mouse click at (column, row) lands on. Coordinates
/// are 0-based as crossterm reports them.
fn strip_note_at(column: u16, row: u16) -> Option<Note> {
    if row + 1 != STRIP_ROW || column + 1 < STRIP_COL {
        return None;
    }
    let index = (column + 1 - STRIP_COL) as usize;
    Note::all().nth(index)
}

fn print_banner(stdout: &mut io::Stdout) {
    let strip: String = Note::all()
        .map(|note| keymap::key_for(note).unwrap_or(' '))
        .collect();
    let banner = format!(
        "\x1b[2J\x1b[H\
clavier live - interactive piano mode\r\n\
─────────────────────────────────────────\r\n\
\r\n\
  Piano (C3 to E5), type a key or click:\r\n\
    {}\r\n\
\r\n\
  Record: Space    Save: Enter    Quit: Esc\r\n\
  Transpose: - / =    Octave: [ / ]    Reset: Backspace\r\n",
        strip
    );
    let _ = write!(stdout, "{}", banner);
    let _ = stdout.flush();
}

fn draw_shift_line(stdout: &mut io::Stdout, shift: Transpose) {
    let _ = write!(
        stdout,
        "\x1b[{};1H\x1b[2K  Transpose: {:+}  |  Octave: {:+}\r",
        SHIFT_ROW,
        shift.steps(),
        shift.octave()
    );
    let _ = stdout.flush();
}

fn show_message(stdout: &mut io::Stdout, text: &str) {
    let _ = write!(stdout, "\x1b[{};1H\x1b[2K  {}\r", MESSAGE_ROW, text);
    let _ = stdout.flush();
}

/// Terminal display sink: redraws the key strip with pressed/upcoming
/// highlights and keeps a status line current.
struct TermSink {
    pressed: HashSet<Note>,
    upcoming: HashSet<Note>,
}

impl TermSink {
    fn new() -> TermSink {
        TermSink {
            pressed: HashSet::new(),
            upcoming: HashSet::new(),
        }
    }

    fn redraw_strip(&self) {
        let mut stdout = io::stdout();
        let _ = write!(stdout, "\x1b[{};{}H", STRIP_ROW, STRIP_COL);
        for note in Note::all() {
            let c = keymap::key_for(note).unwrap_or(' ');
            if self.pressed.contains(&note) {
                let _ = write!(stdout, "\x1b[7m{}\x1b[0m", c);
            } else if self.upcoming.contains(&note) {
                let _ = write!(stdout, "\x1b[4m{}\x1b[0m", c);
            } else {
                let _ = write!(stdout, "{}", c);
            }
        }
        let _ = stdout.flush();
    }
}

impl DisplaySink for TermSink {
    fn key_pressed(&mut self, note: Note, on: bool) {
        if on {
            self.pressed.insert(note);
        } else {
            self.pressed.remove(&note);
        }
        self.redraw_strip();
    }

    fn key_upcoming(&mut self, note: Note, on: bool) {
        if on {
            self.upcoming.insert(note);
        } else {
            self.upcoming.remove(&note);
        }
        self.redraw_strip();
    }

    fn clear_highlights(&mut self) {
        self.pressed.clear();
        self.upcoming.clear();
        self.redraw_strip();
    }

    fn status(&mut self, text: &str, _kind: StatusKind) {
        let mut stdout = io::stdout();
        let _ = write!(stdout, "\x1b[{};1H\x1b[2K  {}\r", STATUS_ROW, text);
        let _ = stdout.flush();
    }

    fn progress(&mut self, _fraction: f64) {
        // Live mode never plays songs; nothing to draw.
    }

    fn controls(&mut self, _controls: Controls) {
        // The help lines are static; no dynamic buttons in a terminal.
    }
}
