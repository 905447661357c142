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

//! Standard MIDI File preview of an instrument layout.
//!
//! The preview is the track a player would record against to produce the
//! source recording: every zone's root note held for attack+hold, then a
//! controller pulse marking the decay tail and the separation gap. Ticks
//! per beat derives from the instrument tempo so that one tick lines up
//! with one millisecond.

use midly::num::{u15, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use tracing::debug;

use crate::instrument::Instrument;

/// Controller number pulsed to mark zone boundaries for the recording
/// operator.
pub const SEPARATOR_CONTROLLER: u8 = 20;

/// All preview events live on this channel.
pub const PREVIEW_CHANNEL: u8 = 0;

/// Error rendering the MIDI preview. Valid instruments only hit these
/// with extreme settings, like a separation too long for a delta time.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("BPM {0} needs {1} ticks per beat, past the SMF limit")]
    TicksPerBeat(u16, u16),

    #[error("Delta of {0}ms cannot be represented in a MIDI file")]
    Delta(f64),

    #[error("Zone {0} has a root outside the MIDI range")]
    Root(String),

    #[error("Failed to write the MIDI file: {0}")]
    Write(#[from] std::io::Error),
}

/// Renders a format-0 SMF auditioning the instrument's zones in order.
pub fn preview(instrument: &Instrument) -> Result<Vec<u8>, PreviewError> {
    let ticks_per_beat = 60000 / instrument.bpm();
    let timing = u15::try_from(ticks_per_beat)
        .ok_or(PreviewError::TicksPerBeat(instrument.bpm(), ticks_per_beat))?;

    let channel = u4::new(PREVIEW_CHANNEL);
    let separator = u7::new(SEPARATOR_CONTROLLER);
    let gap_marker = |delta: u28, value: u8| TrackEvent {
        delta,
        kind: TrackEventKind::Midi {
            channel,
            message: MidiMessage::Controller {
                controller: separator,
                value: u7::new(value),
            },
        },
    };

    let mut events = Vec::with_capacity(instrument.zones().len() * 4 + 2);
    events.push(gap_marker(u28::new(0), 0));
    for zone in instrument.zones() {
        let key = u7::try_from(zone.key_root())
            .ok_or_else(|| PreviewError::Root(zone.id().to_string()))?;
        let vel = u7::try_from(zone.vel_root())
            .ok_or_else(|| PreviewError::Root(zone.id().to_string()))?;

        events.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn { key, vel },
            },
        });
        events.push(TrackEvent {
            delta: delta_ticks(zone.attack_ms() + zone.hold_ms())?,
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff { key, vel },
            },
        });
        events.push(gap_marker(delta_ticks(zone.decay_ms())?, 127));
        events.push(gap_marker(delta_ticks(instrument.separation_ms())?, 0));
    }
    events.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let smf = Smf {
        header: Header {
            format: Format::SingleTrack,
            timing: Timing::Metrical(timing),
        },
        tracks: vec![events],
    };

    let mut bytes = Vec::new();
    smf.write_std(&mut bytes)?;
    debug!(
        name = %instrument.name(),
        zones = instrument.zones().len(),
        bytes = bytes.len(),
        "rendered MIDI preview"
    );
    Ok(bytes)
}

/// Converts milliseconds to whole delta ticks, truncating.
fn delta_ticks(ms: f64) -> Result<u28, PreviewError> {
    u28::try_from(ms.floor() as u32).ok_or(PreviewError::Delta(ms))
}
