mod error;
mod keymap;
mod live;
mod note;
mod pitch;
mod player;
mod recorder;
mod song;
mod synth;
mod ui;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal;

use crate::error::Error;
use crate::pitch::Transpose;
use crate::player::Player;
use crate::song::Song;
use crate::synth::AudioEngine;
use crate::ui::ConsoleSink;

#[derive(Parser)]
#[command(name = "clavier", about = "Terminal virtual piano: play, record, and replay songs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a song file through speakers
    Play {
        /// Path to a .json song file
        file: PathBuf,

        /// Playback speed multiplier (> 0)
        #[arg(long, default_value_t = 1.0)]
        speed: f64,

        /// Transpose in semitones (clamped to -12..=12)
        #[arg(long, default_value_t = 0)]
        transpose: i32,

        /// Octave shift (clamped to -2..=2)
        #[arg(long, default_value_t = 0)]
        octave: i32,
    },

    /// Validate a song file and display its events
    Inspect {
        /// Path to a .json song file
        file: PathBuf,

        /// Show frequencies transposed by this many semitones
        #[arg(long, default_value_t = 0)]
        transpose: i32,

        /// Show frequencies shifted by this many octaves
        #[arg(long, default_value_t = 0)]
        octave: i32,
    },

    /// Interactive piano mode — play and record with the keyboard
    Live,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            file,
            speed,
            transpose,
            octave,
        } => {
            if !(speed > 0.0) {
                eprintln!("speed must be greater than 0");
                std::process::exit(1);
            }
            let song = load_song(&file);
            println!(
                "Playing: {} ({:.1}s at {}x)",
                song.name,
                song.duration / 1000.0 / speed,
                speed
            );
            println!("Controls: Space pause/resume, Esc stop");
            println!();
            if let Err(e) = run_playback(song, speed, transpose, octave) {
                eprintln!("Playback error: {}", e);
                std::process::exit(1);
            }
        }
        Command::Inspect {
            file,
            transpose,
            octave,
        } => {
            let song = load_song(&file);
            let mut shift = Transpose::new();
            shift.shift_steps(transpose);
            shift.shift_octave(octave);
            print_song(&song, shift);
        }
        Command::Live => {
            if let Err(e) = live::run() {
                eprintln!("Live mode error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn load_song(path: &PathBuf) -> Song {
    Song::load(path).unwrap_or_else(|e| {
        eprintln!("Error loading {}: {}", path.display(), e);
        std::process::exit(1);
    })
}

/// Drive the player to completion, polling the keyboard so playback can
/// be paused, resumed, and stopped from the terminal.
fn run_playback(song: Song, speed: f64, transpose: i32, octave: i32) -> Result<(), Error> {
    let engine = AudioEngine::new()?;
    let mut player = Player::new(Box::new(engine), Box::new(ConsoleSink::new()));
    player.set_speed(speed);
    player.shift_steps(transpose);
    player.shift_octave(octave);
    player.load_song(song);

    terminal::enable_raw_mode()
        .map_err(|e| Error::Terminal(format!("failed to enable raw mode: {}", e)))?;

    player.play(Instant::now());

    let result = playback_loop(&mut player);

    player.silence();
    let _ = terminal::disable_raw_mode();
    // Brief silence at the end so the release tails ring out
    std::thread::sleep(Duration::from_millis(150));
    println!();

    result
}

fn playback_loop(player: &mut Player) -> Result<(), Error> {
    loop {
        player.tick(Instant::now());
        if player.is_stopped() {
            return Ok(());
        }

        if !event::poll(Duration::from_millis(15))
            .map_err(|e| Error::Terminal(format!("event poll error: {}", e)))?
        {
            continue;
        }
        let ev = event::read().map_err(|e| Error::Terminal(format!("event read error: {}", e)))?;

        if let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = ev
        {
            match code {
                KeyCode::Esc => {
                    player.stop();
                    return Ok(());
                }
                KeyCode::Char(' ') => {
                    let now = Instant::now();
                    if player.is_paused() {
                        player.play(now);
                    } else if player.is_playing() {
                        player.pause(now);
                    }
                }
                _ => {}
            }
        }
    }
}

fn print_song(song: &Song, shift: Transpose) {
    println!("Name: {}", song.name);
    println!("Duration: {:.1}s", song.duration / 1000.0);
    println!("Notes: {}", song.notes.len());
    println!();
    for event in &song.notes {
        match pitch::transposed_frequency(&event.key, shift) {
            Some(freq) => {
                println!(
                    "  {} at {:.0}ms for {:.0}ms ({:.1} Hz)",
                    event.key, event.start_time, event.duration, freq
                );
            }
            None => {
                println!(
                    "  {} at {:.0}ms for {:.0}ms (not a piano key, will be skipped)",
                    event.key, event.start_time, event.duration
                );
            }
        }
    }
}
