//! Transpose state and pitch math.

use crate::note::Note;

/// Transpose limit in semitones, either direction.
pub const MAX_STEPS: i32 = 12;
/// Octave shift limit, either direction.
pub const MAX_OCTAVES: i32 = 2;

/// Cumulative pitch offset applied to every note: a semitone transpose
/// plus a whole-octave shift, each clamped to its own range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transpose {
    steps: i32,
    octave: i32,
}

impl Transpose {
    pub fn new() -> Transpose {
        Transpose::default()
    }

    pub fn steps(&self) -> i32 {
        self.steps
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    /// Adjust the semitone transpose, clamped to [-12, +12].
    pub fn shift_steps(&mut self, delta: i32) {
        self.steps = (self.steps + delta).clamp(-MAX_STEPS, MAX_STEPS);
    }

    /// Adjust the octave shift, clamped to [-2, +2].
    pub fn shift_octave(&mut self, delta: i32) {
        self.octave = (self.octave + delta).clamp(-MAX_OCTAVES, MAX_OCTAVES);
    }

    pub fn reset_steps(&mut self) {
        self.steps = 0;
    }

    pub fn reset_octave(&mut self) {
        self.octave = 0;
    }

    /// Combined offset in semitones.
    pub fn semitones(&self) -> i32 {
        self.steps + self.octave * 12
    }

    /// Effective frequency for a base frequency under this offset.
    pub fn apply(&self, base_hz: f64) -> f64 {
        base_hz * 2.0_f64.powf(self.semitones() as f64 / 12.0)
    }
}

/// Effective frequency for a song-file note label under the given offset.
/// None signals a label that is not a key on the piano.
pub fn transposed_frequency(key: &str, shift: Transpose) -> Option<f64> {
    Note::parse(key).map(|note| shift.apply(note.frequency()))
}
