// Copyright (C) 2026 the samplepack authors
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

/// Preferred spelling for each pitch class, flats for Eb/Ab/Bb.
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

/// Enharmonic spellings accepted when parsing, same pitch-class order.
const ENHARMONIC_NAMES: [&str; 12] = [
    "B#", "Db", "D", "D#", "Fb", "E#", "Gb", "G", "G#", "A", "A#", "Cb",
];

/// Outputs the scientific pitch name for a MIDI note number (60 -> "C4").
pub fn note_name(midi: u8) -> String {
    let note = NOTE_NAMES[usize::from(midi % 12)];
    let octave = i32::from(midi / 12) - 1;
    format!("{}{}", note, octave)
}

/// Parses a scientific pitch name back into a MIDI note number. Accepts
/// enharmonic spellings ("Db4" and "C#4" are the same note). Returns None
/// for unknown names or notes outside 0-127.
pub fn parse_note_name(name: &str) -> Option<u8> {
    let split = name
        .char_indices()
        .position(|(_, c)| c == '-' || c.is_ascii_digit())?;
    let (note, octave) = name.split_at(split);

    let pitch_class = NOTE_NAMES
        .iter()
        .position(|n| *n == note)
        .or_else(|| ENHARMONIC_NAMES.iter().position(|n| *n == note))?;
    let octave = octave.parse::<i32>().ok()?;

    let midi = (octave + 1) * 12 + pitch_class as i32;
    u8::try_from(midi).ok().filter(|midi| *midi <= 127)
}
