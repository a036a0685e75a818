//! tabripp - fetch Songsterr tabs and turn their drum parts into MIDI.
//!
//! The crate is the acquisition-and-transcoding core: resolve a song link,
//! look up the latest revision, stream the notation file to disk, and for
//! drum jobs convert the percussion track into a standard MIDI file.
//! Jobs run on their own threads and report through per-job progress
//! queues; see [`pipeline`].

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod midi;
pub mod notation;
pub mod pipeline;
pub mod songsterr;
#[cfg(test)]
pub mod test_utils;

pub use error::{Error, Result};
pub use pipeline::{DownloadRequest, JobHandle, JobKind, JobOutcome, Pipeline};
