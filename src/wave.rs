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
use std::io::Cursor;

use tracing::debug;

/// Error for source audio that cannot be read as a WAV container.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Unreadable WAV container: {0}")]
    Unreadable(#[from] hound::Error),
}

/// Decoded PCM payload. Integer bit depths (8/16/24/32) decode to i32,
/// 32-bit float to f32.
#[derive(Clone, Debug, PartialEq)]
pub enum PcmData {
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl PcmData {
    /// Number of samples across all channels.
    pub fn len(&self) -> usize {
        match self {
            PcmData::Int(samples) => samples.len(),
            PcmData::Float(samples) => samples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One decoded WAV: format spec plus interleaved samples. Slices taken
/// from a buffer and clips re-encoded from them keep the exact spec of
/// the source.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveBuffer {
    spec: hound::WavSpec,
    data: PcmData,
}

impl WaveBuffer {
    /// Decodes a WAV container from raw bytes, reading all samples up
    /// front. Fails on anything hound cannot parse, including 64-bit
    /// float payloads.
    pub fn decode(bytes: &[u8]) -> Result<WaveBuffer, DecodeError> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        let data = match spec.sample_format {
            hound::SampleFormat::Float => {
                PcmData::Float(reader.samples::<f32>().collect::<Result<Vec<f32>, _>>()?)
            }
            hound::SampleFormat::Int => {
                PcmData::Int(reader.samples::<i32>().collect::<Result<Vec<i32>, _>>()?)
            }
        };
        let buffer = WaveBuffer { spec, data };
        debug!(
            channels = spec.channels,
            sample_rate = spec.sample_rate,
            bits_per_sample = spec.bits_per_sample,
            frames = buffer.frame_count(),
            "decoded wav"
        );
        Ok(buffer)
    }

    /// Gets the format spec.
    pub fn spec(&self) -> hound::WavSpec {
        self.spec
    }

    /// Gets the channel count.
    pub fn channels(&self) -> u16 {
        self.spec.channels
    }

    /// Gets the sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    /// Gets the bit depth.
    pub fn bits_per_sample(&self) -> u16 {
        self.spec.bits_per_sample
    }

    /// Gets the sample format (integer or float).
    pub fn sample_format(&self) -> hound::SampleFormat {
        self.spec.sample_format
    }

    /// Gets the decoded samples.
    pub fn data(&self) -> &PcmData {
        &self.data
    }

    /// Bytes for one sample at this bit depth, partial bytes rounded up.
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.spec.bits_per_sample.div_ceil(8))
    }

    /// Bytes for one interleaved frame.
    pub fn bytes_per_frame(&self) -> usize {
        self.bytes_per_sample() * usize::from(self.spec.channels)
    }

    /// Number of interleaved frames.
    pub fn frame_count(&self) -> usize {
        self.data.len() / usize::from(self.spec.channels)
    }

    /// Length in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.frame_count() as f64 / f64::from(self.spec.sample_rate) * 1000.0
    }

    /// Copies frames [start, end) into a new buffer with the same spec.
    /// Bounds clamp to the available data; an inverted or fully
    /// out-of-range window yields an empty buffer.
    pub fn slice_frames(&self, start: usize, end: usize) -> WaveBuffer {
        let channels = usize::from(self.spec.channels);
        let lo = start.saturating_mul(channels).min(self.data.len());
        let hi = end.saturating_mul(channels).min(self.data.len()).max(lo);
        let data = match &self.data {
            PcmData::Int(samples) => PcmData::Int(samples[lo..hi].to_vec()),
            PcmData::Float(samples) => PcmData::Float(samples[lo..hi].to_vec()),
        };
        WaveBuffer {
            spec: self.spec,
            data,
        }
    }

    /// Re-encodes this buffer as a standalone WAV, headers sized to the
    /// trimmed payload.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, hound::Error> {
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, self.spec)?;
        match &self.data {
            PcmData::Int(samples) => {
                for sample in samples {
                    writer.write_sample(*sample)?;
                }
            }
            PcmData::Float(samples) => {
                for sample in samples {
                    writer.write_sample(*sample)?;
                }
            }
        }
        writer.finalize()?;
        Ok(cursor.into_inner())
    }
}
