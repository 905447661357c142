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

//! Turns one long audio recording plus a declarative zone layout into
//! multi-format sampler instrument packages.
//!
//! The pipeline, in order:
//! - [instrument]: the validated zone model, its JSON document form, and
//!   keyboard/velocity grid generation
//! - [wave] and [slicer]: WAV decoding and per-zone clip extraction,
//!   with optional auto-gain measurement
//! - [export]: rendering of DecentSampler and Bitwig Studio packages
//! - [midi]: a Standard MIDI File preview of the layout, for recording
//!   the source audio against

pub mod export;
pub mod instrument;
pub mod midi;
pub mod slicer;
mod testutil;
pub mod util;
pub mod wave;

pub use export::Exporter;
pub use instrument::Instrument;
pub use slicer::Slicer;
