//! Test utilities and fixtures for tabripp tests.
//!
//! Builders for notation documents, plus a helper that spins up a fake
//! Songsterr host serving one song.
//!
//! # Example
//!
//! ```ignore
//! use tabripp::test_utils::{mock_document, mock_track};
//!
//! let doc = mock_document(vec![
//!     mock_track(Some("Guitar"), Some(1), vec![vec![40]]),
//!     mock_track(Some("Drums"), None, vec![vec![36, 42]]),
//! ]);
//! ```

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::notation::{Beat, Document, Measure, Note, Track, Voice};

/// A beat holding the given pitches.
pub fn mock_beat(pitches: &[u8]) -> Beat {
    Beat {
        notes: pitches.iter().map(|&pitch| Note { pitch }).collect(),
    }
}

/// A track with one measure and one voice; each inner vec is a beat.
pub fn mock_track(name: Option<&str>, channel: Option<u8>, beats: Vec<Vec<u8>>) -> Track {
    Track {
        name: name.map(str::to_string),
        channel,
        measures: vec![Measure {
            voices: vec![Voice {
                beats: beats.iter().map(|b| mock_beat(b)).collect(),
            }],
        }],
    }
}

/// A document with the given tracks.
pub fn mock_document(tracks: Vec<Track>) -> Document {
    Document {
        title: Some("Test Song".to_string()),
        tracks,
    }
}

/// Start a fake host serving song `id`.
///
/// The revisions endpoint lists a single revision whose `source` points at
/// `/files/{file_name}` on the same server, which returns `body`.
pub async fn mock_songsterr(id: &str, file_name: &str, body: Vec<u8>) -> MockServer {
    let server = MockServer::start().await;
    let source = format!("{}/files/{}", server.uri(), file_name);

    Mock::given(method("GET"))
        .and(path(format!("/api/meta/{id}/revisions")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([{ "source": source }])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/files/{file_name}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;

    server
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_track_shape() {
        let track = mock_track(Some("Drums"), Some(10), vec![vec![36, 42], vec![]]);
        assert_eq!(track.name.as_deref(), Some("Drums"));
        assert_eq!(track.measures.len(), 1);
        assert_eq!(track.measures[0].voices[0].beats.len(), 2);
        assert_eq!(track.measures[0].voices[0].beats[0].notes.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_songsterr_serves_revision() {
        let server = mock_songsterr("7", "x.gp5", b"abc".to_vec()).await;
        let body: serde_json::Value =
            reqwest::get(format!("{}/api/meta/7/revisions", server.uri()))
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
        assert!(body[0]["source"].as_str().unwrap().ends_with("/files/x.gp5"));
    }
}
