//! Songsterr access: link parsing and revision lookup.
//!
//! # Architecture
//!
//! Mirrors the split used for every external service in this crate:
//! - **Link** (`link.rs`) - extracts the numeric song ID from user input
//! - **DTOs** (`dto.rs`) - exact shape of the revisions payload
//! - **Client** (`client.rs`) - HTTP client for the metadata endpoint
//!
//! The API returns revisions newest first. The client relies on that
//! ordering and never re-sorts; if the service ever changes it, the
//! "latest" revision picked here is simply the first one returned.

pub mod client;
pub mod dto;
pub mod link;

pub use client::SongsterrClient;
pub use dto::Revision;
pub use link::SongId;
