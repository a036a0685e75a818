//! Song link parsing.
//!
//! A Songsterr link ends in `s<digits>`, e.g.
//! `https://www.songsterr.com/a/wsa/metallica-one-tab-s444`. The digits are
//! the song ID used by the metadata API and in output file names.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// `s` followed by ASCII digits, anchored at the end.
static SONG_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"s([0-9]+)$").expect("song ID pattern is valid"));

/// Numeric song ID extracted from a link. Always a non-empty digit run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SongId(String);

impl SongId {
    /// Extract the song ID from a link.
    ///
    /// Surrounding whitespace is trimmed; nothing else is normalized, so
    /// trailing query strings or an upper-case `S` cause a [`Error::Parse`].
    pub fn parse(link: &str) -> Result<Self> {
        SONG_ID_RE
            .captures(link.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| SongId(m.as_str().to_string()))
            .ok_or_else(|| Error::Parse(link.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the downloaded tab, e.g. `Song_444.gp5`.
    pub fn tab_file_name(&self, extension: &str) -> String {
        format!("Song_{}.{}", self.0, extension)
    }

    /// File name of the derived drum MIDI, e.g. `Song_444_drum.mid`.
    pub fn drum_midi_file_name(&self) -> String {
        format!("Song_{}_drum.mid", self.0)
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
