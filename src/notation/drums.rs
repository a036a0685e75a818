//! Percussion track selection.

use super::model::{Document, Track};

/// Channel number (1-based) that General MIDI reserves for percussion
pub const DRUM_CHANNEL: u8 = 10;

/// Find the drum track of a document.
///
/// Tracks are checked in order; the first one whose name contains "drum"
/// (case-insensitive) or whose channel is [`DRUM_CHANNEL`] wins.
pub fn select_drum_track(doc: &Document) -> Option<&Track> {
    doc.tracks.iter().find(|track| is_drum_track(track))
}

fn is_drum_track(track: &Track) -> bool {
    let named_drum = track
        .name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().contains("drum"));
    named_drum || track.channel == Some(DRUM_CHANNEL)
}
