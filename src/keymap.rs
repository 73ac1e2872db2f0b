//! Physical keyboard layout: which terminal key plays which piano key.

use crate::note::{KEY_COUNT, Note, NoteName};

/// The fixed key layout, lowest note first: (key char, pitch class,
/// octave). White keys sit on the letter rows, sharps on the digit row
/// above them, spilling onto the letter rows as the range climbs.
pub const KEY_LAYOUT: [(char, NoteName, u8); KEY_COUNT] = [
    ('q', NoteName::C, 3),
    ('2', NoteName::CSharp, 3),
    ('w', NoteName::D, 3),
    ('3', NoteName::DSharp, 3),
    ('e', NoteName::E, 3),
    ('r', NoteName::F, 3),
    ('5', NoteName::FSharp, 3),
    ('t', NoteName::G, 3),
    ('6', NoteName::GSharp, 3),
    ('y', NoteName::A, 3),
    ('7', NoteName::ASharp, 3),
    ('u', NoteName::B, 3),
    ('i', NoteName::C, 4),
    ('9', NoteName::CSharp, 4),
    ('o', NoteName::D, 4),
    ('0', NoteName::DSharp, 4),
    ('p', NoteName::E, 4),
    ('z', NoteName::F, 4),
    ('s', NoteName::FSharp, 4),
    ('x', NoteName::G, 4),
    ('d', NoteName::GSharp, 4),
    ('c', NoteName::A, 4),
    ('f', NoteName::ASharp, 4),
    ('v', NoteName::B, 4),
    ('b', NoteName::C, 5),
    ('h', NoteName::CSharp, 5),
    ('n', NoteName::D, 5),
    ('j', NoteName::DSharp, 5),
    ('m', NoteName::E, 5),
];

/// Map a physical key to its piano note.
pub fn key_to_note(c: char) -> Option<Note> {
    KEY_LAYOUT
        .iter()
        .find(|(key, _, _)| *key == c)
        .map(|&(_, name, octave)| Note::new(name, octave))
}

/// Reverse lookup: which key plays this note. Used to label the piano
/// strip.
pub fn key_for(note: Note) -> Option<char> {
    KEY_LAYOUT
        .iter()
        .find(|&&(_, name, octave)| Note::new(name, octave) == note)
        .map(|&(c, _, _)| c)
}
