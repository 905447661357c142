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

#[cfg(test)]
use std::io::Cursor;

#[cfg(test)]
use hound::{SampleFormat, WavSpec, WavWriter};

/// Spec for an in-memory integer PCM fixture.
#[cfg(test)]
pub fn int_spec(channels: u16, sample_rate: u32, bits_per_sample: u16) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample,
        sample_format: SampleFormat::Int,
    }
}

/// Spec for an in-memory 32-bit float PCM fixture.
#[cfg(test)]
pub fn float_spec(channels: u16, sample_rate: u32) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    }
}

/// Builds a complete WAV container holding the given interleaved integer
/// samples.
#[cfg(test)]
pub fn wav_from_samples_i32(spec: WavSpec, samples: &[i32]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).expect("fixture header should write");
        for sample in samples {
            writer.write_sample(*sample).expect("fixture sample should write");
        }
        writer.finalize().expect("fixture should finalize");
    }
    cursor.into_inner()
}

/// Builds a complete WAV container holding the given interleaved float
/// samples.
#[cfg(test)]
pub fn wav_from_samples_f32(spec: WavSpec, samples: &[f32]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).expect("fixture header should write");
        for sample in samples {
            writer.write_sample(*sample).expect("fixture sample should write");
        }
        writer.finalize().expect("fixture should finalize");
    }
    cursor.into_inner()
}
