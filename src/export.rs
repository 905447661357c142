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

//! Projects an instrument and its sliced clips onto sampler package
//! formats.
//!
//! Every exporter works the same way: run the clip sequence once, stage
//! each clip at a deterministic archive path, render the dialect's
//! definition document with the (possibly freshly measured) zone data,
//! and pack everything into one zip container. Only the documents differ
//! between dialects; clip handling is shared here.

pub mod archive;
pub mod bitwig;
pub mod decent_sampler;
pub mod error;

pub use bitwig::BitwigExporter;
pub use decent_sampler::DecentSamplerExporter;

use crate::instrument::{Instrument, Zone};
use crate::slicer::{Clip, SliceError, Slicer};
use crate::util;
use archive::Archive;
use error::ExportError;

/// A sampler package format. Implementations render one definition
/// document dialect; clip cutting and staging are shared across all of
/// them.
pub trait Exporter {
    /// Produces a complete package archive. The instrument is borrowed
    /// mutably because slicing an autogain instrument rewrites zone
    /// gains, and the rendered document must carry the measured values.
    fn export(&self, instrument: &mut Instrument, slicer: &Slicer)
        -> Result<Vec<u8>, ExportError>;

    /// Extension conventionally given to the finished archive file.
    fn file_extension(&self) -> &'static str;
}

/// Archive path for a zone's clip. Collision free because zone ids are
/// unique within an instrument.
pub(crate) fn clip_path(zone: &Zone) -> String {
    format!(
        "samples/sample_{}_k{}_v{}_{}.wav",
        util::note_name(zone.key_root()),
        zone.key_root(),
        zone.vel_root(),
        zone.id()
    )
}

/// Cuts every clip and stages it in the archive. This drains the whole
/// clip sequence, so any gain measurement has happened by the time a
/// document is rendered.
pub(crate) fn stage_clips(
    instrument: &mut Instrument,
    slicer: &Slicer,
    archive: &mut Archive,
) -> Result<(), ExportError> {
    let clips = slicer
        .clips(instrument)
        .collect::<Result<Vec<Clip>, SliceError>>()?;
    for clip in clips {
        // An unknown id cannot happen for clips the slicer just produced;
        // skipping beats poisoning the whole archive over a stale entry.
        if let Some(zone) = instrument.zone(&clip.zone_id) {
            archive.add(&clip_path(zone), &clip.wav)?;
        }
    }
    Ok(())
}

/// Escapes a value for a double-quoted XML attribute.
pub(crate) fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
