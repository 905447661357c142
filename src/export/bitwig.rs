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

//! Bitwig Studio multisample format: one `multisample.xml` with a flat
//! sample list referencing groups by index, packed as a `multisample`.

use tracing::debug;

use super::archive::Archive;
use super::error::ExportError;
use super::{clip_path, stage_clips, xml_escape, Exporter};
use crate::instrument::{Instrument, Zone};
use crate::slicer::Slicer;

/// Renders the Bitwig multisample dialect.
pub struct BitwigExporter {
    generator: String,
    creator: String,
    group_color: String,
}

impl BitwigExporter {
    pub fn new() -> BitwigExporter {
        BitwigExporter {
            generator: "samplepack".to_string(),
            creator: "samplepack".to_string(),
            group_color: "000000".to_string(),
        }
    }

    fn render_document(&self, instrument: &Instrument, slicer: &Slicer) -> String {
        let groups = instrument.groups();

        let mut doc = String::new();
        doc.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        doc.push_str(&format!(
            "<multisample name=\"{}\">\n",
            xml_escape(instrument.name())
        ));
        doc.push_str(&format!(
            "  <generator>{}</generator>\n",
            xml_escape(&self.generator)
        ));
        doc.push_str("  <category/>\n");
        doc.push_str(&format!(
            "  <creator>{}</creator>\n",
            xml_escape(&self.creator)
        ));
        doc.push_str("  <description/>\n");
        doc.push_str("  <keywords/>\n");
        for group in &groups {
            doc.push_str(&format!(
                "  <group name=\"{}\" color=\"{}\"/>\n",
                xml_escape(group),
                self.group_color
            ));
        }
        for zone in instrument.zones() {
            doc.push_str(&self.render_sample(zone, &groups, slicer));
        }
        doc.push_str("</multisample>\n");
        doc
    }

    fn render_sample(&self, zone: &Zone, groups: &[&str], slicer: &Slicer) -> String {
        let group_index = groups
            .iter()
            .position(|group| *group == zone.group())
            .map(|index| index as i64)
            .unwrap_or(-1);
        let clip_frames = slicer.ms_to_frames(zone.hold_ms() + zone.decay_ms());
        let loop_mode = if zone.loop_enabled() { "loop" } else { "off" };

        let mut sample = format!(
            "  <sample file=\"{}\" gain=\"{:.2}\" group=\"{}\" sample-start=\"0\" sample-stop=\"{}\" zone-logic=\"always-play\">\n",
            xml_escape(&clip_path(zone)),
            zone.gain(),
            group_index,
            clip_frames,
        );
        sample.push_str(&format!(
            "    <key root=\"{}\" low=\"{}\" high=\"{}\" track=\"{}\"/>\n",
            zone.key_root(),
            zone.key_low(),
            zone.key_high(),
            zone.keytrack(),
        ));
        sample.push_str(&format!(
            "    <velocity low=\"{}\" high=\"{}\"/>\n",
            zone.vel_low(),
            zone.vel_high(),
        ));
        sample.push_str(&format!(
            "    <loop mode=\"{}\" start=\"{}\" stop=\"{}\" fade=\"{}\"/>\n",
            loop_mode,
            slicer.ms_to_frames(zone.loop_start_ms()),
            slicer.ms_to_frames(zone.loop_end_ms()),
            zone.loop_fade(),
        ));
        sample.push_str("  </sample>\n");
        sample
    }
}

impl Default for BitwigExporter {
    fn default() -> BitwigExporter {
        BitwigExporter::new()
    }
}

impl Exporter for BitwigExporter {
    fn export(
        &self,
        instrument: &mut Instrument,
        slicer: &Slicer,
    ) -> Result<Vec<u8>, ExportError> {
        let mut archive = Archive::new();
        stage_clips(instrument, slicer, &mut archive)?;

        let document = self.render_document(instrument, slicer);
        archive.add("multisample.xml", document.as_bytes())?;

        let bytes = archive.finish()?;
        debug!(
            name = %instrument.name(),
            zones = instrument.zones().len(),
            bytes = bytes.len(),
            "rendered Bitwig multisample package"
        );
        Ok(bytes)
    }

    fn file_extension(&self) -> &'static str {
        "multisample"
    }
}
