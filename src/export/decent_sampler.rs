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

//! DecentSampler package format: one `{name}.dspreset` document with
//! zones nested inside their group containers, packed as a `dslibrary`.

use tracing::debug;

use super::archive::Archive;
use super::error::ExportError;
use super::{clip_path, stage_clips, xml_escape, Exporter};
use crate::instrument::{Instrument, Zone};
use crate::slicer::Slicer;

/// Renders the DecentSampler preset dialect.
pub struct DecentSamplerExporter {
    min_version: String,
}

impl DecentSamplerExporter {
    pub fn new() -> DecentSamplerExporter {
        DecentSamplerExporter {
            min_version: "1.0.0".to_string(),
        }
    }

    fn render_document(&self, instrument: &Instrument, slicer: &Slicer) -> String {
        let mut doc = String::new();
        doc.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        doc.push_str(&format!(
            "<DecentSampler minVersion=\"{}\">\n",
            xml_escape(&self.min_version)
        ));
        doc.push_str("  <groups>\n");
        for group in instrument.groups() {
            doc.push_str("    <group>\n");
            for zone in instrument.zones_in_group(group) {
                doc.push_str(&self.render_sample(zone, slicer));
            }
            doc.push_str("    </group>\n");
        }
        doc.push_str("  </groups>\n");
        doc.push_str("</DecentSampler>\n");
        doc
    }

    fn render_sample(&self, zone: &Zone, slicer: &Slicer) -> String {
        let mut attrs = format!(
            "path=\"{}\" rootNote=\"{}\" loNote=\"{}\" hiNote=\"{}\" loVel=\"{}\" hiVel=\"{}\" pitchKeyTrack=\"{}\"",
            xml_escape(&clip_path(zone)),
            zone.key_root(),
            zone.key_low(),
            zone.key_high(),
            zone.vel_low(),
            zone.vel_high(),
            zone.keytrack(),
        );
        if zone.loop_enabled() {
            // The crossfade fraction becomes a frame count relative to the
            // clip the loop plays inside, which is the hold+decay window.
            let clip_frames = slicer.ms_to_frames(zone.hold_ms() + zone.decay_ms());
            let crossfade = (zone.loop_fade() * clip_frames as f64).round() as usize;
            attrs.push_str(&format!(
                " loopEnabled=\"true\" loopStart=\"{}\" loopEnd=\"{}\" loopCrossfade=\"{}\"",
                slicer.ms_to_frames(zone.loop_start_ms()),
                slicer.ms_to_frames(zone.loop_end_ms()),
                crossfade,
            ));
        }
        attrs.push_str(&format!(" volume=\"{:.2}dB\"", zone.gain()));
        format!("      <sample {}/>\n", attrs)
    }
}

impl Default for DecentSamplerExporter {
    fn default() -> DecentSamplerExporter {
        DecentSamplerExporter::new()
    }
}

impl Exporter for DecentSamplerExporter {
    fn export(
        &self,
        instrument: &mut Instrument,
        slicer: &Slicer,
    ) -> Result<Vec<u8>, ExportError> {
        let mut archive = Archive::new();
        stage_clips(instrument, slicer, &mut archive)?;

        let document = self.render_document(instrument, slicer);
        archive.add(
            &format!("{}.dspreset", instrument.name()),
            document.as_bytes(),
        )?;

        let bytes = archive.finish()?;
        debug!(
            name = %instrument.name(),
            zones = instrument.zones().len(),
            bytes = bytes.len(),
            "rendered DecentSampler package"
        );
        Ok(bytes)
    }

    fn file_extension(&self) -> &'static str {
        "dslibrary"
    }
}
