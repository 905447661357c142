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

//! Cuts per-zone clips out of one long source recording.
//!
//! The source is assumed to have been recorded against the instrument's
//! layout: each zone occupies attack+hold+decay milliseconds followed by
//! the instrument separation. Slicing walks that layout with a
//! millisecond cursor, keeps the hold+decay window of every zone, and
//! throws the rest away.

use std::slice::IterMut;

use tracing::debug;

use crate::instrument::{Instrument, Zone};
use crate::wave::{DecodeError, PcmData, WaveBuffer};

/// Peaks are corrected toward this level, in dBFS.
pub const AUTOGAIN_TARGET_DB: f64 = -0.5;

/// Error while assembling a clip WAV. Not expected once the source has
/// decoded; typed so exporters can propagate instead of panicking.
#[derive(Debug, thiserror::Error)]
pub enum SliceError {
    #[error("Failed to assemble clip WAV: {0}")]
    ClipEncode(#[from] hound::Error),
}

/// One extracted clip: the zone it belongs to and a standalone WAV.
#[derive(Clone, Debug)]
pub struct Clip {
    pub zone_id: String,
    pub wav: Vec<u8>,
}

/// Slices one decoded source recording into per-zone clips.
pub struct Slicer {
    source: WaveBuffer,
}

impl Slicer {
    /// Decodes the source recording eagerly. This is the only point where
    /// source corruption surfaces; everything downstream works on decoded
    /// frames.
    pub fn new(source_bytes: &[u8]) -> Result<Slicer, DecodeError> {
        Ok(Slicer {
            source: WaveBuffer::decode(source_bytes)?,
        })
    }

    /// Gets the decoded source.
    pub fn source(&self) -> &WaveBuffer {
        &self.source
    }

    /// Converts a millisecond offset to a frame offset, truncating.
    pub fn ms_to_frames(&self, ms: f64) -> usize {
        (f64::from(self.source.sample_rate()) * ms / 1000.0).floor() as usize
    }

    /// Converts a millisecond offset to a byte offset into the interleaved
    /// PCM payload. Always lands on a frame boundary.
    pub fn ms_to_byte_offset(&self, ms: f64) -> usize {
        self.ms_to_frames(ms) * self.source.bytes_per_frame()
    }

    /// Converts a frame offset back to milliseconds. Keeps the fractional
    /// part, so this does not exactly invert ms_to_frames.
    pub fn frames_to_ms(&self, frames: usize) -> f64 {
        frames as f64 / f64::from(self.source.sample_rate()) * 1000.0
    }

    /// Converts a byte offset back to milliseconds.
    pub fn byte_offset_to_ms(&self, bytes: usize) -> f64 {
        let bytes_per_second =
            f64::from(self.source.sample_rate()) * self.source.bytes_per_frame() as f64;
        bytes as f64 / bytes_per_second * 1000.0
    }

    /// Starts one pass of the clip sequence over the instrument's zones,
    /// in order. The sequence is lazy and restartable: every call begins
    /// again at the start of the source, and when the instrument has
    /// autogain set each pass re-measures and rewrites zone gains as it
    /// goes.
    pub fn clips<'a>(&'a self, instrument: &'a mut Instrument) -> Clips<'a> {
        let autogain = instrument.autogain();
        let separation_ms = instrument.separation_ms();
        Clips {
            slicer: self,
            zones: instrument.zones_mut().iter_mut(),
            cursor_ms: 0.0,
            separation_ms,
            autogain,
        }
    }
}

/// Lazy per-zone clip sequence. See [Slicer::clips].
pub struct Clips<'a> {
    slicer: &'a Slicer,
    zones: IterMut<'a, Zone>,
    cursor_ms: f64,
    separation_ms: f64,
    autogain: bool,
}

impl Iterator for Clips<'_> {
    type Item = Result<Clip, SliceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let zone = self.zones.next()?;

        // Both window edges convert from absolute millisecond positions,
        // so truncation never accumulates past one frame per edge.
        let start_ms = self.cursor_ms + zone.attack_ms();
        let end_ms = start_ms + zone.hold_ms() + zone.decay_ms();
        let window = self
            .slicer
            .source
            .slice_frames(self.slicer.ms_to_frames(start_ms), self.slicer.ms_to_frames(end_ms));
        self.cursor_ms += zone.attack_ms() + zone.hold_ms() + zone.decay_ms() + self.separation_ms;

        if self.autogain {
            if let Some(correction) = auto_gain(&window) {
                zone.set_gain(correction);
                debug!(zone = zone.id(), gain = correction, "measured auto-gain");
            }
        }

        match window.to_wav_bytes() {
            Ok(wav) => Some(Ok(Clip {
                zone_id: zone.id().to_string(),
                wav,
            })),
            Err(e) => Some(Err(SliceError::ClipEncode(e))),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.zones.size_hint()
    }
}

/// Correction that moves the clip's peak to AUTOGAIN_TARGET_DB. None for
/// digital silence, which has no measurable level.
fn auto_gain(buffer: &WaveBuffer) -> Option<f64> {
    peak_dbfs(buffer).map(|measured| (measured - AUTOGAIN_TARGET_DB) * -1.0)
}

/// Peak level in dBFS relative to the format ceiling. The scan stops
/// early once a sample reaches the ceiling, since the result cannot get
/// any louder.
fn peak_dbfs(buffer: &WaveBuffer) -> Option<f64> {
    let ceiling = format_ceiling(buffer);
    let mut max = 0.0f64;
    match buffer.data() {
        PcmData::Int(samples) => {
            for sample in samples {
                let magnitude = f64::from(sample.unsigned_abs());
                if magnitude > max {
                    max = magnitude;
                }
                if max >= ceiling {
                    break;
                }
            }
        }
        PcmData::Float(samples) => {
            for sample in samples {
                let magnitude = f64::from(sample.abs());
                if magnitude > max {
                    max = magnitude;
                }
                if max >= ceiling {
                    break;
                }
            }
        }
    }
    if max == 0.0 {
        None
    } else {
        Some(20.0 * (max / ceiling).log10())
    }
}

/// Largest representable magnitude for the buffer's sample format.
fn format_ceiling(buffer: &WaveBuffer) -> f64 {
    match buffer.sample_format() {
        hound::SampleFormat::Float => 1.0,
        hound::SampleFormat::Int => match buffer.bits_per_sample() {
            8 => 127.0,
            16 => 32767.0,
            24 => 8_388_607.0,
            _ => 2_147_483_647.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::NoteRange;
    use crate::testutil;

    fn zone(attack_ms: f64, hold_ms: f64, decay_ms: f64) -> Zone {
        Zone::new(
            NoteRange::new(0, 60, 127),
            NoteRange::new(0, 127, 127),
            attack_ms,
            hold_ms,
            decay_ms,
        )
    }

    /// Mono 16-bit source at 1kHz whose sample values equal their frame
    /// index, so clip contents reveal exactly which frames were cut.
    fn ramp_slicer(frames: i32) -> Slicer {
        let samples: Vec<i32> = (0..frames).collect();
        let bytes = testutil::wav_from_samples_i32(testutil::int_spec(1, 1000, 16), &samples);
        Slicer::new(&bytes).expect("fixture should decode")
    }

    fn collect_clips(slicer: &Slicer, instrument: &mut Instrument) -> Vec<Clip> {
        slicer
            .clips(instrument)
            .collect::<Result<Vec<Clip>, SliceError>>()
            .expect("slicing should succeed")
    }

    fn clip_samples(clip: &Clip) -> Vec<i32> {
        match WaveBuffer::decode(&clip.wav).expect("clip should decode").data() {
            PcmData::Int(samples) => samples.clone(),
            PcmData::Float(_) => panic!("expected int clip"),
        }
    }

    #[test]
    fn test_conversions() {
        let slicer = ramp_slicer(100);
        // 1kHz mono 16-bit: one frame per millisecond, two bytes each.
        assert_eq!(0, slicer.ms_to_frames(0.0));
        assert_eq!(10, slicer.ms_to_frames(10.0));
        assert_eq!(10, slicer.ms_to_frames(10.999));
        assert_eq!(20, slicer.ms_to_byte_offset(10.0));
        assert_eq!(10.0, slicer.frames_to_ms(10));
        assert_eq!(10.0, slicer.byte_offset_to_ms(20));

        let samples: Vec<i32> = vec![0; 96];
        let bytes = testutil::wav_from_samples_i32(testutil::int_spec(2, 48000, 24), &samples);
        let slicer = Slicer::new(&bytes).expect("fixture should decode");
        assert_eq!(48, slicer.ms_to_frames(1.0));
        assert_eq!(47, slicer.ms_to_frames(0.999));
        assert_eq!(48 * 6, slicer.ms_to_byte_offset(1.0));
        assert_eq!(0.5, slicer.frames_to_ms(24));
    }

    #[test]
    fn test_clip_windows_skip_attack_and_separation() {
        let slicer = ramp_slicer(1000);
        let mut instrument = Instrument::new("test", 120, 100.0, false).expect("valid");
        instrument
            .add_zones(vec![zone(10.0, 20.0, 30.0), zone(0.0, 40.0, 0.0)])
            .expect("zones should be accepted");

        let clips = collect_clips(&slicer, &mut instrument);
        assert_eq!(2, clips.len());
        assert_eq!("zone-1", clips[0].zone_id);
        assert_eq!("zone-2", clips[1].zone_id);

        // Zone 1 window: [0+10, 10+50) -> frames 10..60.
        assert_eq!((10..60).collect::<Vec<i32>>(), clip_samples(&clips[0]));
        // Cursor consumed 10+20+30+100; zone 2 window starts at 160ms.
        assert_eq!((160..200).collect::<Vec<i32>>(), clip_samples(&clips[1]));
    }

    #[test]
    fn test_clip_keeps_source_spec() {
        let samples: Vec<i32> = vec![0; 400];
        let spec = testutil::int_spec(2, 44100, 24);
        let bytes = testutil::wav_from_samples_i32(spec, &samples);
        let slicer = Slicer::new(&bytes).expect("fixture should decode");

        let mut instrument = Instrument::new("test", 120, 0.0, false).expect("valid");
        instrument
            .add_zones(vec![zone(0.0, 1.0, 1.0)])
            .expect("zones should be accepted");

        let clips = collect_clips(&slicer, &mut instrument);
        let clip = WaveBuffer::decode(&clips[0].wav).expect("clip should decode");
        assert_eq!(spec, clip.spec());
    }

    #[test]
    fn test_windows_past_the_source_come_back_empty() {
        let slicer = ramp_slicer(50);
        let mut instrument = Instrument::new("test", 120, 0.0, false).expect("valid");
        instrument
            .add_zones(vec![zone(0.0, 40.0, 0.0), zone(0.0, 40.0, 0.0)])
            .expect("zones should be accepted");

        let clips = collect_clips(&slicer, &mut instrument);
        assert_eq!((0..40).collect::<Vec<i32>>(), clip_samples(&clips[0]));
        // The second window [40, 80) only has 10 frames of source left.
        assert_eq!((40..50).collect::<Vec<i32>>(), clip_samples(&clips[1]));
    }

    #[test]
    fn test_clips_restart_from_zero() {
        let slicer = ramp_slicer(500);
        let mut instrument = Instrument::new("test", 120, 5.0, false).expect("valid");
        instrument
            .add_zones(vec![zone(1.0, 30.0, 2.0), zone(0.0, 25.0, 25.0)])
            .expect("zones should be accepted");

        let first: Vec<Vec<u8>> = collect_clips(&slicer, &mut instrument)
            .into_iter()
            .map(|clip| clip.wav)
            .collect();
        let second: Vec<Vec<u8>> = collect_clips(&slicer, &mut instrument)
            .into_iter()
            .map(|clip| clip.wav)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fractional_windows_truncate_per_edge() {
        let slicer = ramp_slicer(100);
        let mut instrument = Instrument::new("test", 120, 0.5, false).expect("valid");
        instrument
            .add_zones(vec![
                zone(0.0, 10.7, 0.0),
                zone(0.0, 10.7, 0.0),
                zone(0.0, 10.7, 0.0),
            ])
            .expect("zones should be accepted");

        let clips = collect_clips(&slicer, &mut instrument);
        // Absolute windows: [0,10.7), [11.2,21.9), [22.4,33.1) -> each
        // floors per edge, so lengths stay within one frame of 10.7.
        assert_eq!((0..10).collect::<Vec<i32>>(), clip_samples(&clips[0]));
        assert_eq!((11..21).collect::<Vec<i32>>(), clip_samples(&clips[1]));
        assert_eq!((22..33).collect::<Vec<i32>>(), clip_samples(&clips[2]));
    }

    #[test]
    fn test_autogain_at_ceiling_corrects_by_half_db() {
        let mut samples = vec![0i32; 100];
        samples[40] = 32767;
        let bytes = testutil::wav_from_samples_i32(testutil::int_spec(1, 1000, 16), &samples);
        let slicer = Slicer::new(&bytes).expect("fixture should decode");

        let mut instrument = Instrument::new("test", 120, 0.0, true).expect("valid");
        instrument
            .add_zones(vec![zone(0.0, 100.0, 0.0)])
            .expect("zones should be accepted");

        collect_clips(&slicer, &mut instrument);
        assert_eq!(-0.5, instrument.zones()[0].gain());
    }

    #[test]
    fn test_autogain_boosts_quiet_clips() {
        let mut samples = vec![0i32; 100];
        samples[10] = 16383;
        samples[20] = -16000;
        let bytes = testutil::wav_from_samples_i32(testutil::int_spec(1, 1000, 16), &samples);
        let slicer = Slicer::new(&bytes).expect("fixture should decode");

        let mut instrument = Instrument::new("test", 120, 0.0, true).expect("valid");
        instrument
            .add_zones(vec![zone(0.0, 100.0, 0.0)])
            .expect("zones should be accepted");
        collect_clips(&slicer, &mut instrument);

        let expected = (20.0 * (16383.0f64 / 32767.0).log10() - AUTOGAIN_TARGET_DB) * -1.0;
        assert_eq!(expected, instrument.zones()[0].gain());
        assert!(instrument.zones()[0].gain() > 0.0);
    }

    #[test]
    fn test_autogain_float_and_8_bit_ceilings() {
        let bytes = testutil::wav_from_samples_f32(testutil::float_spec(1, 1000), &[0.0, 1.0, 0.25]);
        let slicer = Slicer::new(&bytes).expect("fixture should decode");
        let mut instrument = Instrument::new("test", 120, 0.0, true).expect("valid");
        instrument
            .add_zones(vec![zone(0.0, 3.0, 0.0)])
            .expect("zones should be accepted");
        collect_clips(&slicer, &mut instrument);
        assert_eq!(-0.5, instrument.zones()[0].gain());

        let bytes = testutil::wav_from_samples_i32(testutil::int_spec(1, 1000, 8), &[0, 127, 15]);
        let slicer = Slicer::new(&bytes).expect("fixture should decode");
        let mut instrument = Instrument::new("test", 120, 0.0, true).expect("valid");
        instrument
            .add_zones(vec![zone(0.0, 3.0, 0.0)])
            .expect("zones should be accepted");
        collect_clips(&slicer, &mut instrument);
        assert_eq!(-0.5, instrument.zones()[0].gain());
    }

    #[test]
    fn test_autogain_silence_leaves_gain_alone() {
        let bytes = testutil::wav_from_samples_i32(testutil::int_spec(1, 1000, 16), &[0; 100]);
        let slicer = Slicer::new(&bytes).expect("fixture should decode");

        let mut instrument = Instrument::new("test", 120, 0.0, true).expect("valid");
        instrument
            .add_zones(vec![zone(0.0, 100.0, 0.0).with_gain(2.5)])
            .expect("zones should be accepted");
        collect_clips(&slicer, &mut instrument);
        assert_eq!(2.5, instrument.zones()[0].gain());
    }

    #[test]
    fn test_gain_untouched_without_autogain() {
        let mut samples = vec![0i32; 100];
        samples[0] = 32767;
        let bytes = testutil::wav_from_samples_i32(testutil::int_spec(1, 1000, 16), &samples);
        let slicer = Slicer::new(&bytes).expect("fixture should decode");

        let mut instrument = Instrument::new("test", 120, 0.0, false).expect("valid");
        instrument
            .add_zones(vec![zone(0.0, 100.0, 0.0)])
            .expect("zones should be accepted");
        collect_clips(&slicer, &mut instrument);
        assert_eq!(0.0, instrument.zones()[0].gain());
    }
}
