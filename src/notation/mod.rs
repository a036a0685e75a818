//! Notation documents: model, decoding boundary, and drum track selection.
//!
//! Decoding is pluggable through [`DocumentDecoder`]; the pipeline never
//! depends on a specific file format. [`JsonDocumentDecoder`] handles the
//! serde form of [`Document`].

pub mod decoder;
pub mod drums;
pub mod model;

pub use decoder::{DecodeError, DocumentDecoder, JsonDocumentDecoder};
pub use drums::{DRUM_CHANNEL, select_drum_track};
pub use model::{Beat, Document, Measure, Note, Track, Voice};
