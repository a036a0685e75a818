//! Job orchestration.
//!
//! A job turns a song link into files on disk:
//! - [`JobKind::TabOnly`]: resolve ID, fetch latest revision, download
//! - [`JobKind::TabPlusDrumMidi`]: the above, then decode, pick the drum
//!   track and write `Song_{id}_drum.mid`
//!
//! Every job runs on its own named thread with its own single-threaded tokio
//! runtime and its own progress queue. Stages run sequentially; the first
//! failure is reported on the queue and ends the job. Files written by
//! earlier stages are left in place.
//!
//! ```text
//!   caller ──spawn──▶ job thread ──ProgressMessage──▶ unbounded queue ──poll──▶ caller
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;

use crate::config::Config;
use crate::download::{self, DownloadedArtifact, Downloader, ProgressMessage, ProgressSender};
use crate::error::{Error, Result};
use crate::midi;
use crate::notation::{DocumentDecoder, JsonDocumentDecoder, select_drum_track};
use crate::songsterr::{SongId, SongsterrClient};

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

/// What a job produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Download the tab file only
    TabOnly,
    /// Download the tab file and derive a drum MIDI file from it
    TabPlusDrumMidi,
}

/// A single user request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub link: String,
    pub destination_dir: PathBuf,
}

impl DownloadRequest {
    pub fn new(link: impl Into<String>, destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            link: link.into(),
            destination_dir: destination_dir.into(),
        }
    }
}

/// Files produced by a successful job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobArtifacts {
    pub tab: DownloadedArtifact,
    pub drum_midi: Option<PathBuf>,
}

/// Terminal state of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success(JobArtifacts),
    Failed(String),
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Handle to a running job.
///
/// Dropping the handle detaches the job; it still runs to completion.
pub struct JobHandle {
    id: u64,
    kind: JobKind,
    messages: Receiver<ProgressMessage>,
    thread: JoinHandle<JobOutcome>,
}

impl JobHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// The job's progress queue, for callers that want to block or select on it.
    pub fn messages(&self) -> &Receiver<ProgressMessage> {
        &self.messages
    }

    /// Drain every message queued so far without blocking.
    pub fn poll(&self) -> Vec<ProgressMessage> {
        self.messages.try_iter().collect()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Block until the job ends. A panicked job counts as failed.
    pub fn wait(self) -> JobOutcome {
        self.thread
            .join()
            .unwrap_or_else(|_| JobOutcome::Failed("job thread panicked".to_string()))
    }
}

/// Runs download jobs
#[derive(Clone)]
pub struct Pipeline {
    client: SongsterrClient,
    downloader: Downloader,
    decoder: Arc<dyn DocumentDecoder>,
}

impl Pipeline {
    pub fn new(client: SongsterrClient, decoder: Arc<dyn DocumentDecoder>) -> Self {
        Self {
            client,
            downloader: Downloader::new(),
            decoder,
        }
    }

    /// Pipeline against the configured host, decoding with [`JsonDocumentDecoder`]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            SongsterrClient::with_base_url(&config.songsterr.base_url),
            Arc::new(JsonDocumentDecoder),
        )
    }

    /// Start a job on its own thread.
    ///
    /// A panic inside the job is caught on that thread, reported on the
    /// queue and turned into [`JobOutcome::Failed`].
    pub fn spawn(&self, kind: JobKind, request: DownloadRequest) -> Result<JobHandle> {
        let id = NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed);
        let (progress, messages) = download::progress::channel();
        let pipeline = self.clone();

        let thread = thread::Builder::new()
            .name(format!("job-{id}"))
            .spawn(move || {
                let run = AssertUnwindSafe(|| pipeline.run_blocking(id, kind, &request, &progress));
                panic::catch_unwind(run).unwrap_or_else(|cause| {
                    let reason = panic_reason(cause.as_ref());
                    tracing::error!(target: "tabripp::pipeline", job = id, ?kind, %reason, "Job panicked");
                    progress.send(format!("Job stopped unexpectedly: {reason}"));
                    JobOutcome::Failed("job thread panicked".to_string())
                })
            })
            .map_err(|e| Error::Spawn(e.to_string()))?;

        tracing::info!(target: "tabripp::pipeline", job = id, ?kind, "Job started");
        Ok(JobHandle {
            id,
            kind,
            messages,
            thread,
        })
    }

    /// Body of a job thread. Never panics on stage failures.
    fn run_blocking(
        &self,
        job: u64,
        kind: JobKind,
        request: &DownloadRequest,
        progress: &ProgressSender,
    ) -> JobOutcome {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                progress.send(format!("Failed to start job runtime: {e}"));
                return JobOutcome::Failed(e.to_string());
            }
        };

        match runtime.block_on(self.run(kind, request, progress)) {
            Ok(artifacts) => {
                tracing::info!(target: "tabripp::pipeline", job, ?kind, "Job succeeded");
                JobOutcome::Success(artifacts)
            }
            Err(e) => {
                tracing::warn!(target: "tabripp::pipeline", job, ?kind, error = %e, "Job failed");
                report_failure(&e, progress);
                JobOutcome::Failed(e.to_string())
            }
        }
    }

    /// Run all stages of a job on the current task.
    pub async fn run(
        &self,
        kind: JobKind,
        request: &DownloadRequest,
        progress: &ProgressSender,
    ) -> Result<JobArtifacts> {
        progress.send(format!("Parsing link: {}", request.link));
        let id = SongId::parse(&request.link)?;

        progress.send(format!(
            "Fetching revisions from: {}",
            self.client.revisions_url(&id)
        ));
        let source = self.client.latest_source(&id).await?;

        let tab = self
            .downloader
            .download(&source, &request.destination_dir, &id, progress)
            .await?;

        let drum_midi = match kind {
            JobKind::TabOnly => None,
            JobKind::TabPlusDrumMidi => {
                Some(self.derive_drum_midi(&id, &tab, request, progress)?)
            }
        };

        Ok(JobArtifacts { tab, drum_midi })
    }

    fn derive_drum_midi(
        &self,
        id: &SongId,
        tab: &DownloadedArtifact,
        request: &DownloadRequest,
        progress: &ProgressSender,
    ) -> Result<PathBuf> {
        let doc = self.decoder.decode_file(&tab.path)?;
        let track = select_drum_track(&doc).ok_or(Error::NoDrumTrack)?;
        progress.send(format!("Drum track found: {}", track.display_name()));

        let path = request.destination_dir.join(id.drum_midi_file_name());
        progress.send(format!("Converting drum track to MIDI: {}", path.display()));

        let events = midi::synthesize(track);
        midi::write_midi(&events, &path)?;

        progress.send(format!("Drum MIDI conversion complete: {}", path.display()));
        Ok(path)
    }
}

/// Text of a panic payload, when it carries one.
fn panic_reason(cause: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = cause.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = cause.downcast_ref::<String>() {
        text.clone()
    } else {
        "internal error".to_string()
    }
}

/// Turn a stage failure into user-facing progress lines.
fn report_failure(error: &Error, progress: &ProgressSender) {
    match error {
        e if e.is_user_error() => {
            progress.send(e.to_string());
            progress.send("Song links end with the song ID, e.g. ...-drum-tab-s444");
        }
        Error::UnsupportedFormat(_) => {
            progress.send(format!("Error parsing notation file: {error}"));
            progress.send(
                "The downloaded file may be in an unsupported format. \
                 Please check for updates or try a different revision.",
            );
        }
        _ => progress.send(error.to_string()),
    }
}
