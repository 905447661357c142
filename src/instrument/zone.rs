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
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Group assigned to zones that do not name one.
pub const DEFAULT_GROUP: &str = "default";

/// Longest supported time segment (envelope stages, loop points,
/// sample separation) in milliseconds.
pub const MAX_TIME_MS: f64 = 60000.0;

/// Largest gain adjustment, in dB, accepted on a zone. The range is
/// symmetric: [-MAX_GAIN_DB, MAX_GAIN_DB].
pub const MAX_GAIN_DB: f64 = 12.0;

/// An inclusive low/root/high span on one MIDI axis (key or velocity).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteRange {
    pub low: u8,
    pub root: u8,
    pub high: u8,
}

impl NoteRange {
    pub fn new(low: u8, root: u8, high: u8) -> NoteRange {
        NoteRange { low, root, high }
    }
}

/// One sample area: a key-range and velocity-range mapping bound to a slice
/// of the source recording, with envelope timing describing where that slice
/// sits. Field names mirror the persisted instrument document.
#[derive(Deserialize, Clone, Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Zone {
    /// Identifier, unique within an instrument.
    id: String,

    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    /// Group this zone renders under.
    #[serde(default = "default_group")]
    group: String,

    /// Fraction of pitch shift applied per semitone away from the root.
    #[serde(default = "default_keytrack")]
    keytrack: f64,

    /// Gain adjustment in dB. Overwritten by auto-gain measurement.
    #[serde(default)]
    gain: f64,

    /// Envelope stages in milliseconds. These locate the zone's audio in
    /// the source recording; no DSP is applied.
    #[serde(rename = "attack")]
    attack_ms: f64,
    #[serde(rename = "hold")]
    hold_ms: f64,
    #[serde(rename = "decay")]
    decay_ms: f64,

    /// Whether the clip loops during playback.
    #[serde(rename = "loop", default)]
    loop_enabled: bool,

    /// Loop window in milliseconds from the start of the clip.
    #[serde(rename = "loopStart", default)]
    loop_start_ms: f64,
    #[serde(rename = "loopEnd", default)]
    loop_end_ms: f64,

    /// Loop crossfade as a fraction of the clip length, 0-1.
    #[serde(default)]
    loop_fade: f64,

    /// Playable key range and the root note within it.
    key_low: u8,
    key_high: u8,
    key_root: u8,

    /// Playable velocity range and the root velocity within it.
    vel_low: u8,
    vel_high: u8,
    vel_root: u8,
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

fn default_keytrack() -> f64 {
    1.0
}

impl Zone {
    /// Creates a zone over the given key and velocity ranges with the given
    /// envelope timing. All other fields start at their document defaults;
    /// chain the with_ methods to change them.
    pub fn new(key: NoteRange, vel: NoteRange, attack_ms: f64, hold_ms: f64, decay_ms: f64) -> Zone {
        Zone {
            id: String::new(),
            name: None,
            group: default_group(),
            keytrack: default_keytrack(),
            gain: 0.0,
            attack_ms,
            hold_ms,
            decay_ms,
            loop_enabled: false,
            loop_start_ms: 0.0,
            loop_end_ms: 0.0,
            loop_fade: 0.0,
            key_low: key.low,
            key_high: key.high,
            key_root: key.root,
            vel_low: vel.low,
            vel_high: vel.high,
            vel_root: vel.root,
        }
    }

    /// Sets the zone id. Zones without one are assigned an id when added
    /// to an instrument.
    pub fn with_id<S: Into<String>>(mut self, id: S) -> Zone {
        self.id = id.into();
        self
    }

    /// Sets the display name.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Zone {
        self.name = Some(name.into());
        self
    }

    /// Sets the group.
    pub fn with_group<S: Into<String>>(mut self, group: S) -> Zone {
        self.group = group.into();
        self
    }

    /// Sets the keytrack coefficient.
    pub fn with_keytrack(mut self, keytrack: f64) -> Zone {
        self.keytrack = keytrack;
        self
    }

    /// Sets the gain adjustment in dB.
    pub fn with_gain(mut self, gain: f64) -> Zone {
        self.gain = gain;
        self
    }

    /// Enables looping over the given window with the given crossfade
    /// fraction.
    pub fn with_loop(mut self, start_ms: f64, end_ms: f64, fade: f64) -> Zone {
        self.loop_enabled = true;
        self.loop_start_ms = start_ms;
        self.loop_end_ms = end_ms;
        self.loop_fade = fade;
        self
    }

    /// Gets the zone id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Gets the display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Gets the group.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Gets the keytrack coefficient.
    pub fn keytrack(&self) -> f64 {
        self.keytrack
    }

    /// Gets the gain adjustment in dB.
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Gets the attack stage in milliseconds.
    pub fn attack_ms(&self) -> f64 {
        self.attack_ms
    }

    /// Gets the hold stage in milliseconds.
    pub fn hold_ms(&self) -> f64 {
        self.hold_ms
    }

    /// Gets the decay stage in milliseconds.
    pub fn decay_ms(&self) -> f64 {
        self.decay_ms
    }

    /// Whether the clip loops during playback.
    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    /// Gets the loop start in milliseconds.
    pub fn loop_start_ms(&self) -> f64 {
        self.loop_start_ms
    }

    /// Gets the loop end in milliseconds.
    pub fn loop_end_ms(&self) -> f64 {
        self.loop_end_ms
    }

    /// Gets the loop crossfade fraction.
    pub fn loop_fade(&self) -> f64 {
        self.loop_fade
    }

    /// Gets the low end of the playable key range.
    pub fn key_low(&self) -> u8 {
        self.key_low
    }

    /// Gets the high end of the playable key range.
    pub fn key_high(&self) -> u8 {
        self.key_high
    }

    /// Gets the root note.
    pub fn key_root(&self) -> u8 {
        self.key_root
    }

    /// Gets the low end of the playable velocity range.
    pub fn vel_low(&self) -> u8 {
        self.vel_low
    }

    /// Gets the high end of the playable velocity range.
    pub fn vel_high(&self) -> u8 {
        self.vel_high
    }

    /// Gets the root velocity.
    pub fn vel_root(&self) -> u8 {
        self.vel_root
    }

    /// Writes a measured gain value. Used by auto-gain, which may land
    /// outside the range accepted from a document.
    pub(crate) fn set_gain(&mut self, gain: f64) {
        self.gain = gain;
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }

    pub(crate) fn set_group(&mut self, group: String) {
        self.group = group;
    }

    /// Validates every field against the document schema. The id must
    /// already be assigned; it names the zone in error messages.
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        self.check("keytrack", self.keytrack, 0.0, 1.0)?;
        self.check("gain", self.gain, -MAX_GAIN_DB, MAX_GAIN_DB)?;
        self.check("attack", self.attack_ms, 0.0, MAX_TIME_MS)?;
        self.check("hold", self.hold_ms, 0.0, MAX_TIME_MS)?;
        self.check("decay", self.decay_ms, 0.0, MAX_TIME_MS)?;
        self.check("loopStart", self.loop_start_ms, 0.0, MAX_TIME_MS)?;
        self.check("loopEnd", self.loop_end_ms, 0.0, MAX_TIME_MS)?;
        self.check("loopFade", self.loop_fade, 0.0, 1.0)?;
        for (field, value) in [
            ("keyLow", self.key_low),
            ("keyHigh", self.key_high),
            ("keyRoot", self.key_root),
            ("velLow", self.vel_low),
            ("velHigh", self.vel_high),
            ("velRoot", self.vel_root),
        ] {
            self.check(field, f64::from(value), 0.0, 127.0)?;
        }
        if !(self.key_low <= self.key_root && self.key_root <= self.key_high) {
            return Err(ValidationError::ZoneBounds(self.id.clone(), "key"));
        }
        if !(self.vel_low <= self.vel_root && self.vel_root <= self.vel_high) {
            return Err(ValidationError::ZoneBounds(self.id.clone(), "velocity"));
        }
        Ok(())
    }

    fn check(&self, field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
        if value < min || value > max || !value.is_finite() {
            return Err(ValidationError::ZoneField {
                zone: self.id.clone(),
                field,
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}
