//! Drum MIDI synthesis.
//!
//! Each note of the drum track becomes a note-on immediately followed by a
//! note-off 480 ticks later, on the percussion channel. Beat durations,
//! chords and rests are not modelled: notes play back to back, one quarter
//! note each, in document order.

use std::path::Path;

use midly::num::{u4, u7, u15, u28};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

use crate::error::{Error, Result};
use crate::notation::Track;

/// Zero-based MIDI channel for percussion (channel 10 on the wire)
pub const PERCUSSION_CHANNEL: u8 = 9;
/// Ticks per quarter note in written files
pub const TICKS_PER_BEAT: u16 = 480;
/// Length of every synthesized note
pub const NOTE_TICKS: u32 = 480;
/// Velocity of every note-on
pub const NOTE_ON_VELOCITY: u8 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEventKind {
    NoteOn,
    NoteOff,
}

/// A timed channel message; `delta_ticks` is relative to the previous event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    pub kind: MidiEventKind,
    pub channel: u8,
    pub pitch: u8,
    pub velocity: u8,
    pub delta_ticks: u32,
}

impl MidiEvent {
    pub fn note_on(pitch: u8) -> Self {
        Self {
            kind: MidiEventKind::NoteOn,
            channel: PERCUSSION_CHANNEL,
            pitch,
            velocity: NOTE_ON_VELOCITY,
            delta_ticks: 0,
        }
    }

    pub fn note_off(pitch: u8) -> Self {
        Self {
            kind: MidiEventKind::NoteOff,
            channel: PERCUSSION_CHANNEL,
            pitch,
            velocity: 0,
            delta_ticks: NOTE_TICKS,
        }
    }

    fn to_track_event(self) -> TrackEvent<'static> {
        let key = u7::from(self.pitch);
        let vel = u7::from(self.velocity);
        let message = match self.kind {
            MidiEventKind::NoteOn => MidiMessage::NoteOn { key, vel },
            MidiEventKind::NoteOff => MidiMessage::NoteOff { key, vel },
        };
        TrackEvent {
            delta: u28::from(self.delta_ticks),
            kind: TrackEventKind::Midi {
                channel: u4::from(self.channel),
                message,
            },
        }
    }
}

/// Convert a drum track into on/off event pairs, one pair per note.
pub fn synthesize(track: &Track) -> Vec<MidiEvent> {
    track
        .notes()
        .flat_map(|note| [MidiEvent::note_on(note.pitch), MidiEvent::note_off(note.pitch)])
        .collect()
}

/// Build a single-track standard MIDI file from `events`.
pub fn to_smf(events: &[MidiEvent]) -> Smf<'static> {
    let mut track: Vec<TrackEvent<'static>> =
        events.iter().map(|e| e.to_track_event()).collect();
    track.push(TrackEvent {
        delta: u28::from(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    Smf {
        header: Header::new(
            Format::SingleTrack,
            Timing::Metrical(u15::from(TICKS_PER_BEAT)),
        ),
        tracks: vec![track],
    }
}

/// Serialize `events` and save them to `path`.
///
/// A failed write is reported as [`Error::Write`]; anything partially
/// written stays on disk.
pub fn write_midi(events: &[MidiEvent], path: &Path) -> Result<()> {
    let smf = to_smf(events);
    let mut buffer = Vec::new();
    smf.write_std(&mut buffer)
        .map_err(|e| Error::write(path, e))?;
    std::fs::write(path, buffer).map_err(|e| Error::write(path, e))?;

    tracing::info!(
        target: "tabripp::midi",
        path = %path.display(),
        events = events.len(),
        "Wrote drum MIDI"
    );
    Ok(())
}
