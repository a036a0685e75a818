//! Document decoding boundary.
//!
//! Any format reader that produces a [`Document`] can drive the drum
//! pipeline by implementing [`DocumentDecoder`].

use std::path::Path;

use super::model::Document;

/// Errors raised while turning bytes into a [`Document`]
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Failed to read {0}: {1}")]
    Io(std::path::PathBuf, std::io::Error),

    #[error("Not a recognized notation document: {0}")]
    Syntax(String),

    #[error("Note pitch {0} is outside the MIDI range 0-127")]
    PitchOutOfRange(u8),
}

/// Turns raw notation bytes into a [`Document`].
pub trait DocumentDecoder: Send + Sync {
    /// Decode a complete document from memory.
    fn decode(&self, bytes: &[u8]) -> Result<Document, DecodeError>;

    /// Read and decode a file.
    fn decode_file(&self, path: &Path) -> Result<Document, DecodeError> {
        let bytes = std::fs::read(path).map_err(|e| DecodeError::Io(path.to_path_buf(), e))?;
        self.decode(&bytes)
    }
}

/// Decodes the JSON form of [`Document`].
///
/// Binary formats (Guitar Pro and friends) are rejected with
/// [`DecodeError::Syntax`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentDecoder;

impl DocumentDecoder for JsonDocumentDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Document, DecodeError> {
        let doc: Document =
            serde_json::from_slice(bytes).map_err(|e| DecodeError::Syntax(e.to_string()))?;

        if let Some(note) = doc
            .tracks
            .iter()
            .flat_map(|t| t.notes())
            .find(|n| n.pitch > 127)
        {
            return Err(DecodeError::PitchOutOfRange(note.pitch));
        }
        Ok(doc)
    }
}
