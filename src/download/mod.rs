//! Streaming download of notation files.
//!
//! The body is read as it arrives, regrouped into fixed 4096-byte chunks and
//! appended to `Song_{id}.{ext}` in the destination directory. After each
//! chunk a progress message is emitted when the server declared a
//! `Content-Length`.
//!
//! A failed download leaves whatever was written so far on disk. Nothing is
//! cleaned up or retried.

pub mod progress;

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::songsterr::SongId;
use crate::songsterr::client::{USER_AGENT, build_or_default};

pub use progress::{ProgressMessage, ProgressSender, format_percent};

/// Bytes written per chunk
pub const CHUNK_SIZE: usize = 4096;

/// A notation file saved to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArtifact {
    pub path: PathBuf,
    pub byte_size: u64,
}

/// Downloads notation files over HTTP
///
/// Bodies are saved exactly as sent. The client never asks for or undoes a
/// `Content-Encoding`, so `Content-Length` matches the bytes on the wire.
#[derive(Debug, Clone)]
pub struct Downloader {
    http_client: reqwest::Client,
}

impl Downloader {
    pub fn new() -> Self {
        Self::with_client(build_or_default(
            reqwest::Client::builder().no_gzip().user_agent(USER_AGENT),
        ))
    }

    /// Use a caller-supplied client as is
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Download `url` into `dest_dir` as `Song_{id}.{ext}`.
    ///
    /// `dest_dir` is created if missing. An existing file at the target
    /// path is truncated.
    pub async fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        id: &SongId,
        progress: &ProgressSender,
    ) -> Result<DownloadedArtifact> {
        std::fs::create_dir_all(dest_dir).map_err(|e| Error::write(dest_dir, e))?;

        let extension = extension_from_url(url)
            .ok_or_else(|| Error::Payload(format!("source URL has no file extension: {url}")))?;
        let path = dest_dir.join(id.tab_file_name(&extension));
        progress.send(format!(
            "Found tab for Songsterr ID {id} - saving as {}",
            path.display()
        ));

        let mut response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(Error::network)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::Remote {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let total = response.content_length();
        tracing::info!(
            target: "tabripp::download",
            %url,
            path = %path.display(),
            content_length = ?total,
            "Starting download"
        );

        let file = File::create(&path).map_err(|e| Error::write(&path, e))?;
        let mut sink = ChunkSink::new(file, &path, total, progress);

        let mut pending: Vec<u8> = Vec::with_capacity(CHUNK_SIZE);
        loop {
            let bytes = match response.chunk().await {
                Ok(Some(bytes)) => bytes,
                Ok(None) => break,
                Err(e) => {
                    // Keep what already arrived on disk
                    if !pending.is_empty() {
                        sink.write_chunk(&pending)?;
                    }
                    sink.finish()?;
                    tracing::warn!(target: "tabripp::download", %url, error = %e, "Body stream failed");
                    return Err(Error::network(e));
                }
            };
            let mut rest = &bytes[..];
            while !rest.is_empty() {
                let take = (CHUNK_SIZE - pending.len()).min(rest.len());
                pending.extend_from_slice(&rest[..take]);
                rest = &rest[take..];
                if pending.len() == CHUNK_SIZE {
                    sink.write_chunk(&pending)?;
                    pending.clear();
                }
            }
        }
        if !pending.is_empty() {
            sink.write_chunk(&pending)?;
        }
        let byte_size = sink.finish()?;

        tracing::info!(target: "tabripp::download", path = %path.display(), byte_size, "Download complete");
        progress.send(format!("Download complete: {}", path.display()));

        Ok(DownloadedArtifact { path, byte_size })
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes chunks to the destination file and reports progress after each.
struct ChunkSink<'a> {
    file: File,
    path: &'a Path,
    total: Option<u64>,
    written: u64,
    progress: &'a ProgressSender,
}

impl<'a> ChunkSink<'a> {
    fn new(file: File, path: &'a Path, total: Option<u64>, progress: &'a ProgressSender) -> Self {
        Self {
            file,
            path,
            total,
            written: 0,
            progress,
        }
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.file
            .write_all(chunk)
            .map_err(|e| Error::write(self.path, e))?;
        self.written += chunk.len() as u64;

        if let Some(percent) = format_percent(self.written, self.total) {
            self.progress
                .send(format!("Downloading... {percent}% complete"));
        }
        Ok(())
    }

    fn finish(mut self) -> Result<u64> {
        self.file.flush().map_err(|e| Error::write(self.path, e))?;
        Ok(self.written)
    }
}

/// Extension of the file named by `url`: the text after the last `.` in the
/// final path segment. Query strings and fragments are ignored.
pub fn extension_from_url(url: &str) -> Option<String> {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    let file_name = path.rsplit('/').next()?;
    let (_, extension) = file_name.rsplit_once('.')?;
    (!extension.is_empty()).then(|| extension.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn song() -> SongId {
        SongId::parse("s444").unwrap()
    }

    async fn serve_file(body: Vec<u8>, status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/one.gp5"))
            .respond_with(ResponseTemplate::new(status).set_body_bytes(body))
            .mount(&server)
            .await;
        server
    }

    fn body(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    /// Answer one request with `response` verbatim, then close the socket.
    fn serve_raw(response: Vec<u8>) -> String {
        use std::io::Read;

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(&response).unwrap();
            stream.flush().unwrap();
        });
        format!("http://{addr}/files/one.gp5")
    }

    fn raw_response(headers: &str, body: &[u8]) -> Vec<u8> {
        let mut response = format!("HTTP/1.1 200 OK\r\n{headers}\r\n").into_bytes();
        response.extend_from_slice(body);
        response
    }

    #[test]
    fn test_extension_from_url() {
        assert_eq!(
            extension_from_url("https://d.example/files/one.gp5").as_deref(),
            Some("gp5")
        );
        assert_eq!(
            extension_from_url("https://d.example/v1.2/one.tar.gz?sig=a.b").as_deref(),
            Some("gz")
        );
        assert_eq!(extension_from_url("https://d.example/files/one"), None);
        assert_eq!(extension_from_url("https://d.example/files/"), None);
        assert_eq!(extension_from_url("not a url/one.gpx").as_deref(), Some("gpx"));
    }

    #[tokio::test]
    async fn test_download_reports_chunked_progress() {
        let data = body(10_000);
        let server = serve_file(data.clone(), 200).await;
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = progress::channel();

        let downloader = Downloader::new();
        let url = format!("{}/files/one.gp5", server.uri());
        let artifact = downloader
            .download(&url, dir.path(), &song(), &tx)
            .await
            .unwrap();

        assert_eq!(artifact.path, dir.path().join("Song_444.gp5"));
        assert_eq!(artifact.byte_size, 10_000);
        assert_eq!(std::fs::read(&artifact.path).unwrap(), data);

        let texts: Vec<String> = rx.try_iter().map(|m| m.text).collect();
        let percents: Vec<&str> = texts
            .iter()
            .map(String::as_str)
            .filter(|t| t.starts_with("Downloading..."))
            .collect();
        assert_eq!(
            percents,
            [
                "Downloading... 40.9% complete",
                "Downloading... 81.9% complete",
                "Downloading... 100.0% complete",
            ]
        );
        assert!(texts[0].starts_with("Found tab for Songsterr ID 444"));
        assert!(texts.last().unwrap().starts_with("Download complete:"));
        assert!(texts.last().unwrap().contains("Song_444.gp5"));
    }

    #[tokio::test]
    async fn test_download_creates_nested_destination() {
        let server = serve_file(body(100), 200).await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a").join("b");
        let (tx, _rx) = progress::channel();

        let url = format!("{}/files/one.gp5", server.uri());
        let artifact = Downloader::new()
            .download(&url, &dest, &song(), &tx)
            .await
            .unwrap();

        assert!(artifact.path.starts_with(&dest));
        assert_eq!(artifact.byte_size, 100);
    }

    #[tokio::test]
    async fn test_download_overwrites_previous_file() {
        let server = serve_file(body(10), 200).await;
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("Song_444.gp5");
        std::fs::write(&stale, vec![0xFF; 5000]).unwrap();
        let (tx, _rx) = progress::channel();

        let url = format!("{}/files/one.gp5", server.uri());
        Downloader::new()
            .download(&url, dir.path(), &song(), &tx)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&stale).unwrap(), body(10));
    }

    #[tokio::test]
    async fn test_download_non_200() {
        let server = serve_file(Vec::new(), 403).await;
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = progress::channel();

        let url = format!("{}/files/one.gp5", server.uri());
        let err = Downloader::new()
            .download(&url, dir.path(), &song(), &tx)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Remote { status: 403, .. }));
        assert!(!dir.path().join("Song_444.gp5").exists());
    }

    #[tokio::test]
    async fn test_download_keeps_content_encoding_bytes() {
        // Not valid gzip: decoding it would fail the download
        let wire = body(10_000);
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/one.gp5"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Encoding", "gzip")
                    .set_body_bytes(wire.clone()),
            )
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = progress::channel();

        let url = format!("{}/files/one.gp5", server.uri());
        let artifact = Downloader::new()
            .download(&url, dir.path(), &song(), &tx)
            .await
            .unwrap();

        assert_eq!(artifact.byte_size, 10_000);
        assert_eq!(std::fs::read(&artifact.path).unwrap(), wire);
        let percents = rx
            .try_iter()
            .filter(|m| m.text.starts_with("Downloading..."))
            .count();
        assert_eq!(percents, 3);
    }

    #[tokio::test]
    async fn test_download_without_content_length() {
        let data = body(10_000);
        let mut chunked = Vec::new();
        for part in data.chunks(3000) {
            chunked.extend_from_slice(format!("{:x}\r\n", part.len()).as_bytes());
            chunked.extend_from_slice(part);
            chunked.extend_from_slice(b"\r\n");
        }
        chunked.extend_from_slice(b"0\r\n\r\n");
        let url = serve_raw(raw_response("Transfer-Encoding: chunked\r\n", &chunked));
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = progress::channel();

        let artifact = Downloader::new()
            .download(&url, dir.path(), &song(), &tx)
            .await
            .unwrap();

        assert_eq!(artifact.byte_size, 10_000);
        assert_eq!(std::fs::read(&artifact.path).unwrap(), data);
        let texts: Vec<String> = rx.try_iter().map(|m| m.text).collect();
        assert!(!texts.iter().any(|t| t.starts_with("Downloading...")));
        assert!(texts.last().unwrap().starts_with("Download complete:"));
    }

    #[tokio::test]
    async fn test_truncated_body_keeps_partial_file() {
        let url = serve_raw(raw_response("Content-Length: 10000\r\n", &body(6000)));
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = progress::channel();

        let err = Downloader::new()
            .download(&url, dir.path(), &song(), &tx)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Network(_)));
        let partial = dir.path().join("Song_444.gp5");
        assert_eq!(std::fs::read(&partial).unwrap(), body(6000));
        let texts: Vec<String> = rx.try_iter().map(|m| m.text).collect();
        assert!(!texts.iter().any(|t| t.starts_with("Download complete")));
    }

    #[tokio::test]
    async fn test_download_without_extension_fails_before_request() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = progress::channel();

        let err = Downloader::new()
            .download("http://127.0.0.1:9/files/one", dir.path(), &song(), &tx)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Payload(_)));
    }
}
