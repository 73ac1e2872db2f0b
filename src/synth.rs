use std::sync::mpsc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::error::Error;
use crate::note::Note;

/// Peak voice gain after the attack ramp.
const PEAK_GAIN: f64 = 0.3;
/// Attack ramp length in seconds (silence to peak, avoids clicks).
const ATTACK_SECS: f64 = 0.010;
/// Release ramp length in seconds (current level to silence).
const RELEASE_SECS: f64 = 0.100;

/// Where triggered tones go. The player drives the audio backend (or a
/// test double) through this.
pub trait ToneSink {
    /// Begin a tone. Starting a note that is already sounding is ignored.
    fn start(&mut self, note: Note, freq: f64);
    /// Release a tone. Unknown or already-released notes are a no-op.
    fn stop(&mut self, note: Note);
    /// Release everything currently sounding.
    fn stop_all(&mut self);
}

/// A command sent to the audio thread
enum AudioCommand {
    NoteOn { note: Note, freq: f64 },
    NoteOff { note: Note },
    AllNotesOff,
    Shutdown,
}

#[derive(PartialEq)]
enum Stage {
    Attack,
    Sustain,
    Release,
}

/// One sounding note inside the audio callback.
struct Voice {
    freq: f64,
    phase: f64,
    gain: f64,
    stage: Stage,
}

impl Voice {
    fn new(freq: f64) -> Voice {
        Voice {
            freq,
            phase: 0.0,
            gain: 0.0,
            stage: Stage::Attack,
        }
    }

    fn release(&mut self) {
        self.stage = Stage::Release;
    }

    /// Advance one sample. None once the release ramp has reached silence.
    fn next_sample(&mut self, sample_rate: f64) -> Option<f64> {
        match self.stage {
            Stage::Attack => {
                self.gain += PEAK_GAIN / (ATTACK_SECS * sample_rate);
                if self.gain >= PEAK_GAIN {
                    self.gain = PEAK_GAIN;
                    self.stage = Stage::Sustain;
                }
            }
            Stage::Sustain => {}
            Stage::Release => {
                self.gain -= PEAK_GAIN / (RELEASE_SECS * sample_rate);
                if self.gain <= 0.0 {
                    return None;
                }
            }
        }
        let value = triangle(self.phase) * self.gain;
        self.phase = (self.phase + self.freq / sample_rate).fract();
        Some(value)
    }
}

/// Triangle waveform at unit amplitude for a phase in [0, 1).
fn triangle(phase: f64) -> f64 {
    if phase < 0.5 {
        4.0 * phase - 1.0
    } else {
        3.0 - 4.0 * phase
    }
}

/// Polyphonic audio engine: a cpal output stream fed by a command channel.
/// Voice state lives entirely on the audio thread; the rest of the program
/// only ever sends commands.
pub struct AudioEngine {
    tx: mpsc::Sender<AudioCommand>,
    _stream: cpal::Stream,
}

impl AudioEngine {
    pub fn new() -> Result<AudioEngine, Error> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output audio device available".into()))?;

        let config = device
            .default_output_config()
            .map_err(|e| Error::Audio(format!("failed to get default output config: {}", e)))?;

        let sample_rate = config.sample_rate() as f64;

        let (tx, rx) = mpsc::channel::<AudioCommand>();
        // One entry per sounding voice. A note has at most one voice that
        // is not yet releasing; released voices stay in the list ringing
        // out, so a quick re-press overlaps the fading tail.
        let mut voices: Vec<(Note, Voice)> = Vec::new();

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    // Drain pending commands (non-blocking)
                    while let Ok(cmd) = rx.try_recv() {
                        match cmd {
                            AudioCommand::NoteOn { note, freq } => {
                                let sounding = voices
                                    .iter()
                                    .any(|(n, v)| *n == note && v.stage != Stage::Release);
                                if !sounding {
                                    voices.push((note, Voice::new(freq)));
                                }
                            }
                            AudioCommand::NoteOff { note } => {
                                for (n, voice) in voices.iter_mut() {
                                    if *n == note {
                                        voice.release();
                                    }
                                }
                            }
                            AudioCommand::AllNotesOff => {
                                for (_, voice) in voices.iter_mut() {
                                    voice.release();
                                }
                            }
                            AudioCommand::Shutdown => {
                                voices.clear();
                            }
                        }
                    }

                    for sample in data.iter_mut() {
                        let mut value = 0.0_f64;
                        voices.retain_mut(|(_, voice)| match voice.next_sample(sample_rate) {
                            Some(s) => {
                                value += s;
                                true
                            }
                            None => false,
                        });
                        *sample = value.clamp(-1.0, 1.0) as f32;
                    }
                },
                move |err| {
                    log::warn!("audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| Error::Audio(format!("failed to build output stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| Error::Audio(format!("failed to play stream: {}", e)))?;

        Ok(AudioEngine {
            tx,
            _stream: stream,
        })
    }

    fn send(&self, cmd: AudioCommand) {
        if self.tx.send(cmd).is_err() {
            log::warn!("audio thread disconnected");
        }
    }
}

impl ToneSink for AudioEngine {
    fn start(&mut self, note: Note, freq: f64) {
        self.send(AudioCommand::NoteOn { note, freq });
    }

    fn stop(&mut self, note: Note) {
        self.send(AudioCommand::NoteOff { note });
    }

    fn stop_all(&mut self) {
        self.send(AudioCommand::AllNotesOff);
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        let _ = self.tx.send(AudioCommand::Shutdown);
    }
}
