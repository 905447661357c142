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

/// Typed error for instrument and zone validation so callers can
/// distinguish a malformed document from an out-of-range field.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Malformed instrument document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("BPM {0} is outside {1}-{2}")]
    Bpm(u16, u16, u16),

    #[error("Sample separation {0}ms is outside 0-{1}ms")]
    Separation(f64, f64),

    #[error("Zone {zone}: {field} {value} is outside {min}-{max}")]
    ZoneField {
        zone: String,
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Zone {0}: {1} bounds must satisfy low <= root <= high")]
    ZoneBounds(String, &'static str),

    #[error("Duplicate zone id {0}")]
    DuplicateZoneId(String),
}

/// Error for grid parameters that cannot produce a valid partition.
#[derive(Debug, thiserror::Error)]
pub enum RangeError {
    #[error("Axis start {0} is greater than end {1}")]
    InvertedAxis(u8, u8),

    #[error("Step count must be at least 1")]
    ZeroSteps,

    #[error("Step count {0} exceeds the {1} available values")]
    TooManySteps(u32, u32),

    #[error("Zone width must be at least 1")]
    ZeroWidth,

    #[error("Root position {0} is outside 0-1")]
    RootPosition(f64),
}

/// Grid generation can fail on the partition itself or on assembling the
/// resulting instrument.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
