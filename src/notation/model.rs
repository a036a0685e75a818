//! Hierarchical notation document.
//!
//! `Document -> Track -> Measure -> Voice -> Beat -> Note`, all in document
//! order. The pipeline only reads these types.

use serde::{Deserialize, Serialize};

/// A decoded notation document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// One instrument part
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub name: Option<String>,
    /// MIDI channel as written in the document (1-based), if any
    #[serde(default)]
    pub channel: Option<u8>,
    #[serde(default)]
    pub measures: Vec<Measure>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    #[serde(default)]
    pub voices: Vec<Voice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    #[serde(default)]
    pub beats: Vec<Beat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// A struck note. For percussion tracks `pitch` is the General MIDI drum key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: u8,
}

impl Track {
    /// All notes of the track, flattened in document order.
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.measures
            .iter()
            .flat_map(|m| &m.voices)
            .flat_map(|v| &v.beats)
            .flat_map(|b| &b.notes)
    }

    /// Name for display, empty string when unnamed
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}
