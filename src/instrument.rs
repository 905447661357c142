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

//! The instrument model: a named, validated collection of zones.
//!
//! An instrument holds global tempo/separation settings plus an ordered
//! list of sample areas, and round-trips losslessly through a JSON
//! document. Zones are appended in validated batches or produced in bulk
//! by grid generation; once built, the only mutation the export path
//! performs is the auto-gain write-back on each zone's gain field.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod error;
pub mod grid;
mod zone;

pub use zone::{NoteRange, Zone, DEFAULT_GROUP, MAX_GAIN_DB, MAX_TIME_MS};

use error::ValidationError;

/// Tempo bounds enforced on construction and set_tempo.
pub const MIN_BPM: u16 = 10;
pub const MAX_BPM: u16 = 500;

/// Tempo bounds accepted from a persisted document, deliberately wider
/// than the setter bounds.
const MIN_DOCUMENT_BPM: u16 = 1;
const MAX_DOCUMENT_BPM: u16 = 999;

/// Flat size added to output estimates to cover archive and document
/// overhead.
const ESTIMATE_OVERHEAD_BYTES: f64 = 20000.0;

/// Source format assumed by output estimates when the real one is not
/// known yet.
pub const DEFAULT_ESTIMATE_SAMPLE_RATE: u32 = 48000;
pub const DEFAULT_ESTIMATE_BIT_DEPTH: u16 = 16;
pub const DEFAULT_ESTIMATE_CHANNELS: u16 = 2;

/// A named multisample instrument. Field names mirror the persisted
/// document.
#[derive(Deserialize, Clone, Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Instrument {
    /// Instrument name, also used to name definition documents.
    name: String,

    /// Tempo the source recording was played at.
    bpm: u16,

    /// Silent gap between consecutive zones in the source recording.
    #[serde(rename = "sampleSeparation")]
    sample_separation_ms: f64,

    /// Whether slicing measures a gain correction per zone.
    #[serde(default)]
    autogain: bool,

    /// Zones in recording order.
    sample_areas: Vec<Zone>,
}

impl Instrument {
    /// Creates an empty instrument. Fails if the tempo is outside
    /// [MIN_BPM, MAX_BPM]; a negative separation clamps to 0.
    pub fn new<S: Into<String>>(
        name: S,
        bpm: u16,
        separation_ms: f64,
        autogain: bool,
    ) -> Result<Instrument, ValidationError> {
        check_bpm(bpm, MIN_BPM, MAX_BPM)?;
        Ok(Instrument {
            name: name.into(),
            bpm,
            sample_separation_ms: separation_ms.max(0.0),
            autogain,
            sample_areas: Vec::new(),
        })
    }

    /// Parses and validates an instrument document.
    pub fn from_json(text: &str) -> Result<Instrument, ValidationError> {
        let mut instrument: Instrument = serde_json::from_str(text)?;
        instrument.validate_document()?;
        debug!(
            name = %instrument.name,
            zones = instrument.sample_areas.len(),
            "parsed instrument document"
        );
        Ok(instrument)
    }

    /// Serializes to the canonical pretty-printed document form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Gets the instrument name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the tempo in beats per minute.
    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    /// Sets the tempo, rejecting values outside [MIN_BPM, MAX_BPM].
    pub fn set_tempo(&mut self, bpm: u16) -> Result<(), ValidationError> {
        check_bpm(bpm, MIN_BPM, MAX_BPM)?;
        self.bpm = bpm;
        Ok(())
    }

    /// Gets the inter-zone separation in milliseconds.
    pub fn separation_ms(&self) -> f64 {
        self.sample_separation_ms
    }

    /// Sets the inter-zone separation. Negative values clamp to 0; there
    /// is no upper clamp here, only the document bound on deserialize.
    pub fn set_separation(&mut self, ms: f64) {
        self.sample_separation_ms = ms.max(0.0);
    }

    /// Whether slicing measures per-zone gain corrections.
    pub fn autogain(&self) -> bool {
        self.autogain
    }

    /// Sets the auto-gain flag.
    pub fn set_autogain(&mut self, autogain: bool) {
        self.autogain = autogain;
    }

    /// Gets the zones in recording order.
    pub fn zones(&self) -> &[Zone] {
        &self.sample_areas
    }

    /// Mutable zone access for the slicer's gain write-back.
    pub(crate) fn zones_mut(&mut self) -> &mut [Zone] {
        &mut self.sample_areas
    }

    /// Finds a zone by id.
    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.sample_areas.iter().find(|zone| zone.id() == id)
    }

    /// Gets the distinct groups in first-seen order.
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for zone in &self.sample_areas {
            if !groups.contains(&zone.group()) {
                groups.push(zone.group());
            }
        }
        groups
    }

    /// Gets the zones belonging to a group, in recording order.
    pub fn zones_in_group(&self, group: &str) -> Vec<&Zone> {
        self.sample_areas
            .iter()
            .filter(|zone| zone.group() == group)
            .collect()
    }

    /// Appends a batch of zones. Zones with an empty id get a generated
    /// one; an empty group becomes DEFAULT_GROUP. The whole batch is
    /// validated first: on any failure nothing is appended.
    pub fn add_zones<I>(&mut self, zones: I) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = Zone>,
    {
        let mut staged: Vec<Zone> = zones.into_iter().collect();

        // Claim explicit ids first so generated ones can never collide
        // with an id appearing later in the batch.
        let mut taken: HashSet<String> = self
            .sample_areas
            .iter()
            .map(|zone| zone.id().to_owned())
            .collect();
        for zone in &staged {
            if zone.id().is_empty() {
                continue;
            }
            if !taken.insert(zone.id().to_owned()) {
                return Err(ValidationError::DuplicateZoneId(zone.id().to_owned()));
            }
        }

        let mut ordinal = self.sample_areas.len() + 1;
        for zone in &mut staged {
            if zone.group().is_empty() {
                zone.set_group(DEFAULT_GROUP.to_string());
            }
            if !zone.id().is_empty() {
                continue;
            }
            let id = loop {
                let candidate = format!("zone-{}", ordinal);
                ordinal += 1;
                if taken.insert(candidate.clone()) {
                    break candidate;
                }
            };
            zone.set_id(id);
        }

        for zone in &staged {
            zone.validate()?;
        }

        debug!(count = staged.len(), total = self.sample_areas.len() + staged.len(), "added zones");
        self.sample_areas.extend(staged);
        Ok(())
    }

    /// Total sampled audio in milliseconds: the hold+decay window of every
    /// zone. Attack and separation are consumed from the source but not
    /// kept in the clips.
    pub fn duration_ms(&self) -> f64 {
        self.sample_areas
            .iter()
            .map(|zone| zone.hold_ms() + zone.decay_ms())
            .sum()
    }

    /// Source recording length in milliseconds implied by the layout:
    /// duration_ms plus attack and one separation per zone. The final
    /// zone's separation is counted too, so this overshoots the strict
    /// gap total by one separation.
    pub fn full_duration_ms(&self) -> f64 {
        let attacks: f64 = self.sample_areas.iter().map(|zone| zone.attack_ms()).sum();
        self.duration_ms()
            + attacks
            + self.sample_separation_ms * self.sample_areas.len() as f64
    }

    /// Rough output size in bytes for clips cut from a source with the
    /// given format. Deterministic estimate only, used for capacity hints.
    pub fn estimated_output_bytes(&self, sample_rate: u32, bit_depth: u16, channels: u16) -> f64 {
        let bytes_per_sample = f64::from(bit_depth.div_ceil(8));
        (self.duration_ms() / 1000.0)
            * f64::from(sample_rate)
            * bytes_per_sample
            * f64::from(channels)
            + ESTIMATE_OVERHEAD_BYTES
    }

    /// Document-side validation: wider tempo bounds, capped separation,
    /// unique ids, per-zone schema checks.
    fn validate_document(&mut self) -> Result<(), ValidationError> {
        check_bpm(self.bpm, MIN_DOCUMENT_BPM, MAX_DOCUMENT_BPM)?;
        if !(0.0..=MAX_TIME_MS).contains(&self.sample_separation_ms) {
            return Err(ValidationError::Separation(
                self.sample_separation_ms,
                MAX_TIME_MS,
            ));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for zone in &mut self.sample_areas {
            if zone.group().is_empty() {
                zone.set_group(DEFAULT_GROUP.to_string());
            }
        }
        for zone in &self.sample_areas {
            if !seen.insert(zone.id()) {
                return Err(ValidationError::DuplicateZoneId(zone.id().to_owned()));
            }
            zone.validate()?;
        }
        Ok(())
    }
}

fn check_bpm(bpm: u16, min: u16, max: u16) -> Result<(), ValidationError> {
    if bpm < min || bpm > max {
        return Err(ValidationError::Bpm(bpm, min, max));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(hold_ms: f64, decay_ms: f64) -> Zone {
        Zone::new(
            NoteRange::new(0, 60, 127),
            NoteRange::new(0, 127, 127),
            0.0,
            hold_ms,
            decay_ms,
        )
    }

    #[test]
    fn test_set_tempo_bounds() {
        let mut instrument = Instrument::new("test", 120, 0.0, false).expect("valid instrument");

        assert!(matches!(
            instrument.set_tempo(5),
            Err(ValidationError::Bpm(5, MIN_BPM, MAX_BPM))
        ));
        assert!(instrument.set_tempo(128).is_ok());
        assert_eq!(128, instrument.bpm());
        assert!(instrument.set_tempo(501).is_err());
        assert_eq!(128, instrument.bpm());

        assert!(Instrument::new("test", 9, 0.0, false).is_err());
        assert!(Instrument::new("test", 500, 0.0, false).is_ok());
    }

    #[test]
    fn test_set_separation_clamps_negative() {
        let mut instrument = Instrument::new("test", 120, 50.0, false).expect("valid instrument");
        instrument.set_separation(-10.0);
        assert_eq!(0.0, instrument.separation_ms());

        // The setter has no upper bound; only documents do.
        instrument.set_separation(90000.0);
        assert_eq!(90000.0, instrument.separation_ms());

        let clamped = Instrument::new("test", 120, -1.0, false).expect("valid instrument");
        assert_eq!(0.0, clamped.separation_ms());
    }

    #[test]
    fn test_add_zones_generates_ids_and_groups() {
        let mut instrument = Instrument::new("test", 120, 0.0, false).expect("valid instrument");
        instrument
            .add_zones(vec![
                zone(100.0, 0.0),
                zone(100.0, 0.0).with_id("kick").with_group("drums"),
                zone(100.0, 0.0),
            ])
            .expect("zones should be accepted");

        let ids: Vec<&str> = instrument.zones().iter().map(|z| z.id()).collect();
        assert_eq!(vec!["zone-1", "kick", "zone-2"], ids);
        assert_eq!(DEFAULT_GROUP, instrument.zones()[0].group());
        assert_eq!("drums", instrument.zones()[1].group());
    }

    #[test]
    fn test_generated_ids_skip_taken_ones() {
        let mut instrument = Instrument::new("test", 120, 0.0, false).expect("valid instrument");
        instrument
            .add_zones(vec![zone(100.0, 0.0).with_id("zone-1"), zone(100.0, 0.0)])
            .expect("zones should be accepted");
        assert_eq!("zone-2", instrument.zones()[1].id());
    }

    #[test]
    fn test_add_zones_is_transactional() {
        let mut instrument = Instrument::new("test", 120, 0.0, false).expect("valid instrument");
        let result = instrument.add_zones(vec![
            zone(100.0, 0.0),
            zone(100.0, 0.0).with_keytrack(2.0),
        ]);

        assert!(result.is_err());
        assert!(instrument.zones().is_empty());
    }

    #[test]
    fn test_add_zones_rejects_duplicate_ids() {
        let mut instrument = Instrument::new("test", 120, 0.0, false).expect("valid instrument");
        let result = instrument.add_zones(vec![
            zone(100.0, 0.0).with_id("a"),
            zone(100.0, 0.0).with_id("a"),
        ]);
        assert!(matches!(result, Err(ValidationError::DuplicateZoneId(id)) if id == "a"));
        assert!(instrument.zones().is_empty());

        instrument
            .add_zones(vec![zone(100.0, 0.0).with_id("a")])
            .expect("first use of the id is fine");
        assert!(instrument
            .add_zones(vec![zone(100.0, 0.0).with_id("a")])
            .is_err());
        assert_eq!(1, instrument.zones().len());
    }

    #[test]
    fn test_groups_first_seen_order() {
        let mut instrument = Instrument::new("test", 120, 0.0, false).expect("valid instrument");
        instrument
            .add_zones(vec![
                zone(100.0, 0.0).with_group("pads"),
                zone(100.0, 0.0),
                zone(100.0, 0.0).with_group("pads"),
                zone(100.0, 0.0).with_group("keys"),
            ])
            .expect("zones should be accepted");

        assert_eq!(vec!["pads", DEFAULT_GROUP, "keys"], instrument.groups());
        let pads = instrument.zones_in_group("pads");
        assert_eq!(2, pads.len());
        assert_eq!("zone-1", pads[0].id());
        assert_eq!("zone-3", pads[1].id());
        assert!(instrument.zones_in_group("missing").is_empty());
    }

    #[test]
    fn test_find_zone() {
        let mut instrument = Instrument::new("test", 120, 0.0, false).expect("valid instrument");
        instrument
            .add_zones(vec![zone(100.0, 0.0).with_id("kick")])
            .expect("zones should be accepted");

        assert_eq!("kick", instrument.zone("kick").expect("zone exists").id());
        assert!(instrument.zone("snare").is_none());
    }

    #[test]
    fn test_duration_formulas() {
        let mut instrument = Instrument::new("test", 120, 100.0, false).expect("valid instrument");
        instrument
            .add_zones(vec![
                Zone::new(
                    NoteRange::new(0, 60, 127),
                    NoteRange::new(0, 127, 127),
                    10.0,
                    600.0,
                    400.0,
                ),
                Zone::new(
                    NoteRange::new(0, 60, 127),
                    NoteRange::new(0, 127, 127),
                    20.0,
                    300.0,
                    200.0,
                ),
            ])
            .expect("zones should be accepted");

        assert_eq!(1500.0, instrument.duration_ms());
        // Attack (10+20) and one separation per zone (2 * 100), including
        // the final zone's separation.
        assert_eq!(1730.0, instrument.full_duration_ms());
    }

    #[test]
    fn test_estimated_output_bytes() {
        let mut instrument = Instrument::new("test", 120, 0.0, false).expect("valid instrument");
        instrument
            .add_zones(vec![zone(600.0, 400.0)])
            .expect("zones should be accepted");

        // One second of 48kHz 16-bit stereo plus the flat overhead.
        let estimate = instrument.estimated_output_bytes(
            DEFAULT_ESTIMATE_SAMPLE_RATE,
            DEFAULT_ESTIMATE_BIT_DEPTH,
            DEFAULT_ESTIMATE_CHANNELS,
        );
        assert_eq!(48000.0 * 2.0 * 2.0 + 20000.0, estimate);

        // 24-bit rounds up to 3 bytes per sample.
        let estimate = instrument.estimated_output_bytes(44100, 24, 1);
        assert_eq!(44100.0 * 3.0 + 20000.0, estimate);
    }

    #[test]
    fn test_round_trip() {
        let mut instrument = Instrument::new("Round Trip", 128, 250.0, true).expect("valid");
        instrument
            .add_zones(vec![
                Zone::new(
                    NoteRange::new(0, 32, 63),
                    NoteRange::new(0, 63, 63),
                    5.0,
                    1000.0,
                    500.0,
                )
                .with_name("low soft")
                .with_group("layer-a")
                .with_keytrack(0.5)
                .with_gain(-3.0)
                .with_loop(100.0, 900.0, 0.25),
                Zone::new(
                    NoteRange::new(64, 96, 127),
                    NoteRange::new(64, 127, 127),
                    5.0,
                    1000.0,
                    500.0,
                ),
            ])
            .expect("zones should be accepted");

        let json = instrument.to_json().expect("serializes");
        let back = Instrument::from_json(&json).expect("parses");
        assert_eq!(instrument, back);
    }

    #[test]
    fn test_document_field_names() {
        let mut instrument = Instrument::new("Names", 128, 0.0, false).expect("valid");
        instrument
            .add_zones(vec![zone(100.0, 0.0)])
            .expect("zones should be accepted");
        let json = instrument.to_json().expect("serializes");

        assert!(json.contains("\"sampleSeparation\""));
        assert!(json.contains("\"sampleAreas\""));
        assert!(json.contains("\"autogain\""));
    }

    #[test]
    fn test_document_validation() {
        let document = |bpm: u16, separation: f64| {
            format!(
                r#"{{"name": "Doc", "bpm": {}, "sampleSeparation": {}, "sampleAreas": []}}"#,
                bpm, separation
            )
        };

        // Documents accept tempos the setter would reject.
        let relaxed = Instrument::from_json(&document(7, 0.0)).expect("document bpm 7 is valid");
        assert_eq!(7, relaxed.bpm());
        assert!(Instrument::from_json(&document(0, 0.0)).is_err());
        assert!(Instrument::from_json(&document(1000, 0.0)).is_err());

        // Separation is capped on read, unlike the setter.
        assert!(Instrument::from_json(&document(120, 60001.0)).is_err());

        assert!(matches!(
            Instrument::from_json(r#"{"name": "Doc", "bpm": 120, "volume": 11, "sampleSeparation": 0, "sampleAreas": []}"#),
            Err(ValidationError::Document(_))
        ));
    }

    #[test]
    fn test_document_rejects_duplicate_ids() {
        let result = Instrument::from_json(
            r#"{
                "name": "Doc", "bpm": 120, "sampleSeparation": 0,
                "sampleAreas": [
                    {"id": "a", "attack": 0, "hold": 100, "decay": 0,
                     "keyLow": 0, "keyHigh": 127, "keyRoot": 60,
                     "velLow": 0, "velHigh": 127, "velRoot": 127},
                    {"id": "a", "attack": 0, "hold": 100, "decay": 0,
                     "keyLow": 0, "keyHigh": 127, "keyRoot": 60,
                     "velLow": 0, "velHigh": 127, "velRoot": 127}
                ]
            }"#,
        );
        assert!(matches!(result, Err(ValidationError::DuplicateZoneId(_))));
    }

    #[test]
    fn test_document_rejects_out_of_range_zone() {
        let result = Instrument::from_json(
            r#"{
                "name": "Doc", "bpm": 120, "sampleSeparation": 0,
                "sampleAreas": [
                    {"id": "a", "attack": 0, "hold": 100, "decay": 0, "keytrack": 3,
                     "keyLow": 0, "keyHigh": 127, "keyRoot": 60,
                     "velLow": 0, "velHigh": 127, "velRoot": 127}
                ]
            }"#,
        );
        assert!(matches!(result, Err(ValidationError::ZoneField { .. })));
    }
}
