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

//! Grid generation: partition a key range and a velocity range into
//! integer bands and lay one zone per band pair.

use tracing::debug;

use super::error::{GridError, RangeError};
use super::zone::{NoteRange, Zone};
use super::Instrument;

/// Default fractional root position on the key axis: the band midpoint.
pub const DEFAULT_KEY_ROOT_POS: f64 = 0.5;

/// Default fractional root position on the velocity axis: the band's
/// high end.
pub const DEFAULT_VEL_ROOT_POS: f64 = 1.0;

/// One contiguous integer band of an axis partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Band {
    pub low: u8,
    pub high: u8,
}

impl Band {
    /// Places a root at a fractional position within the band: 0 is the
    /// low bound, 1 the high bound, rounding to the nearest value.
    fn root_at(&self, position: f64) -> u8 {
        self.low + (f64::from(self.high - self.low) * position).round() as u8
    }
}

/// Partitions an inclusive integer axis range into contiguous bands. The
/// two implementations have deliberately different remainder semantics
/// and are not interchangeable.
pub trait GridStrategy {
    /// Splits [start, end] into bands with no gaps and no overlaps. The
    /// first band must start at `start` and the last must close at `end`.
    fn partition(&self, start: u8, end: u8) -> Result<Vec<Band>, RangeError>;
}

/// Splits an axis into a fixed number of bands. A remainder is diffused
/// across the bands one value at a time, landing in early bands first.
pub struct StepCount(pub u32);

impl GridStrategy for StepCount {
    fn partition(&self, start: u8, end: u8) -> Result<Vec<Band>, RangeError> {
        if start > end {
            return Err(RangeError::InvertedAxis(start, end));
        }
        let steps = self.0;
        if steps == 0 {
            return Err(RangeError::ZeroSteps);
        }
        let span = u32::from(end - start) + 1;
        if steps > span {
            return Err(RangeError::TooManySteps(steps, span));
        }

        let base = span / steps;
        let remainder = span % steps;
        let mut bands = Vec::with_capacity(steps as usize);
        let mut low = u32::from(start);
        // Seeding the accumulator at steps-1 flushes the first extra value
        // into the first band rather than the last.
        let mut acc = steps - 1;
        for _ in 0..steps {
            let mut width = base;
            acc += remainder;
            if acc >= steps {
                width += 1;
                acc -= steps;
            }
            let high = low + width - 1;
            bands.push(Band {
                low: low as u8,
                high: high as u8,
            });
            low = high + 1;
        }
        Ok(bands)
    }
}

/// Splits an axis into bands of a fixed width. The final band truncates
/// at the axis end; a width wider than the whole span yields one band.
pub struct FixedWidth(pub u32);

impl GridStrategy for FixedWidth {
    fn partition(&self, start: u8, end: u8) -> Result<Vec<Band>, RangeError> {
        if start > end {
            return Err(RangeError::InvertedAxis(start, end));
        }
        let width = self.0;
        if width == 0 {
            return Err(RangeError::ZeroWidth);
        }

        let end = u32::from(end);
        let mut bands = Vec::new();
        let mut low = u32::from(start);
        while low <= end {
            let high = end.min(low + width - 1);
            bands.push(Band {
                low: low as u8,
                high: high as u8,
            });
            low = high + 1;
        }
        Ok(bands)
    }
}

/// Layout of one grid axis: the requested bounds, how to partition them,
/// and where roots sit within each band.
pub struct AxisParams {
    start: u8,
    end: u8,
    strategy: Box<dyn GridStrategy>,
    fill: bool,
    root_pos: f64,
}

impl AxisParams {
    /// Key-axis layout, roots at band midpoints.
    pub fn key<S: GridStrategy + 'static>(start: u8, end: u8, strategy: S) -> AxisParams {
        AxisParams {
            start,
            end,
            strategy: Box::new(strategy),
            fill: false,
            root_pos: DEFAULT_KEY_ROOT_POS,
        }
    }

    /// Velocity-axis layout, roots at band high ends.
    pub fn velocity<S: GridStrategy + 'static>(start: u8, end: u8, strategy: S) -> AxisParams {
        AxisParams {
            start,
            end,
            strategy: Box::new(strategy),
            fill: false,
            root_pos: DEFAULT_VEL_ROOT_POS,
        }
    }

    /// Extends the first band's playable range to 0 and the last band's to
    /// 127. Roots keep their pre-fill positions.
    pub fn with_fill(mut self) -> AxisParams {
        self.fill = true;
        self
    }

    /// Overrides the fractional root position (0 = low bound, 1 = high).
    pub fn with_root_pos(mut self, position: f64) -> AxisParams {
        self.root_pos = position;
        self
    }
}

/// Parameters for generating a complete grid-layout instrument. Envelope
/// and loop settings apply to every generated zone.
pub struct GridParams {
    pub name: String,
    pub bpm: u16,
    pub separation_ms: f64,
    pub autogain: bool,
    pub key: AxisParams,
    pub vel: AxisParams,
    pub attack_ms: f64,
    pub hold_ms: f64,
    pub decay_ms: f64,
    pub keytrack: f64,
    pub loop_enabled: bool,
    pub loop_start_ms: f64,
    pub loop_end_ms: f64,
    pub loop_fade: f64,
    /// Append one extra zone per key band covering velocities above the
    /// requested grid, rooted at 127.
    pub vel_overshoot: bool,
}

impl GridParams {
    /// Creates params with neutral settings: 120 bpm, no separation, no
    /// autogain, full keytrack, no loop, no overshoot layer.
    pub fn new<S: Into<String>>(
        name: S,
        key: AxisParams,
        vel: AxisParams,
        attack_ms: f64,
        hold_ms: f64,
        decay_ms: f64,
    ) -> GridParams {
        GridParams {
            name: name.into(),
            bpm: 120,
            separation_ms: 0.0,
            autogain: false,
            key,
            vel,
            attack_ms,
            hold_ms,
            decay_ms,
            keytrack: 1.0,
            loop_enabled: false,
            loop_start_ms: 0.0,
            loop_end_ms: 0.0,
            loop_fade: 0.0,
            vel_overshoot: false,
        }
    }
}

/// Generates a complete instrument: one zone per key-band × velocity-band
/// pair, velocity varying fastest, plus the optional overshoot layer at
/// the end. Zone ids are assigned by the instrument and are deterministic
/// for identical params.
pub fn generate(params: GridParams) -> Result<Instrument, GridError> {
    check_root_pos(params.key.root_pos)?;
    check_root_pos(params.vel.root_pos)?;

    let key_bands = params
        .key
        .strategy
        .partition(params.key.start, params.key.end)?;
    let vel_bands = params
        .vel
        .strategy
        .partition(params.vel.start, params.vel.end)?;

    let key_ranges = ranges_for(&key_bands, params.key.fill, params.key.root_pos);
    let vel_ranges = ranges_for(&vel_bands, params.vel.fill, params.vel.root_pos);

    let mut zones = Vec::with_capacity(key_ranges.len() * (vel_ranges.len() + 1));
    for key in &key_ranges {
        for vel in &vel_ranges {
            zones.push(build_zone(&params, *key, *vel));
        }
    }

    // The overshoot layer only exists when the grid leaves velocities
    // open above it; fill already extends the top band to 127.
    if params.vel_overshoot && !params.vel.fill && params.vel.end < 127 {
        for key in &key_ranges {
            let vel = NoteRange::new(params.vel.end + 1, 127, 127);
            zones.push(build_zone(&params, *key, vel));
        }
    }

    debug!(
        key_bands = key_bands.len(),
        vel_bands = vel_bands.len(),
        zones = zones.len(),
        "generated grid layout"
    );

    let mut instrument = Instrument::new(
        params.name,
        params.bpm,
        params.separation_ms,
        params.autogain,
    )?;
    instrument.add_zones(zones)?;
    Ok(instrument)
}

/// Computes the playable range and root for each band. Fill widens the
/// outermost bands' playable ranges; roots are placed on the original
/// bands first so they never move.
fn ranges_for(bands: &[Band], fill: bool, root_pos: f64) -> Vec<NoteRange> {
    let last = bands.len() - 1;
    bands
        .iter()
        .enumerate()
        .map(|(i, band)| {
            let mut low = band.low;
            let mut high = band.high;
            if fill {
                if i == 0 {
                    low = 0;
                }
                if i == last {
                    high = 127;
                }
            }
            NoteRange {
                low,
                root: band.root_at(root_pos),
                high,
            }
        })
        .collect()
}

fn build_zone(params: &GridParams, key: NoteRange, vel: NoteRange) -> Zone {
    let mut zone = Zone::new(key, vel, params.attack_ms, params.hold_ms, params.decay_ms)
        .with_keytrack(params.keytrack);
    if params.loop_enabled {
        zone = zone.with_loop(params.loop_start_ms, params.loop_end_ms, params.loop_fade);
    }
    zone
}

fn check_root_pos(position: f64) -> Result<(), RangeError> {
    if !(0.0..=1.0).contains(&position) {
        return Err(RangeError::RootPosition(position));
    }
    Ok(())
}
