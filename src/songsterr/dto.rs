//! Songsterr API Data Transfer Objects
//!
//! `GET /api/meta/{id}/revisions` returns a JSON array of revision objects,
//! newest first. Only `source` (URL of the notation file) is consumed; the
//! remaining fields are kept untyped so schema drift elsewhere in the object
//! never breaks a download.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// One revision of a song's tablature
#[derive(Debug, Clone, Deserialize)]
pub struct Revision {
    /// URL of the binary notation document. `None` when absent, null,
    /// not a string, or empty.
    #[serde(default, deserialize_with = "non_empty_string")]
    pub source: Option<String>,

    /// Everything else the API sends (revisionId, title, createdAt, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Revision {
    /// `revisionId` if present, for logging only.
    pub fn revision_id(&self) -> Option<&Value> {
        self.extra.get("revisionId")
    }
}

fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}
