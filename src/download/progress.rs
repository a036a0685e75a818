//! Progress messages and the per-job queue they travel on.
//!
//! Each job owns one unbounded crossbeam channel. Producers never block and
//! messages stay queued in FIFO order until the consumer drains them. If the
//! consumer has gone away, sends are silently dropped.

use crossbeam_channel::{Receiver, Sender, unbounded};

/// A single human-readable progress line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressMessage {
    pub text: String,
}

impl ProgressMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl std::fmt::Display for ProgressMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Producer half of a job's progress queue
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: Sender<ProgressMessage>,
}

impl ProgressSender {
    /// Push a message. Never blocks.
    pub fn send(&self, text: impl Into<String>) {
        let message = ProgressMessage::new(text);
        tracing::debug!(target: "tabripp::progress", text = %message.text);
        // Receiver dropped means nobody is listening anymore
        let _ = self.tx.send(message);
    }
}

/// Create a fresh progress queue.
pub fn channel() -> (ProgressSender, Receiver<ProgressMessage>) {
    let (tx, rx) = unbounded();
    (ProgressSender { tx }, rx)
}

/// Render download progress truncated to one decimal place, e.g. `40.9`.
///
/// Returns `None` when no usable total is known. Integer arithmetic keeps
/// the final value exactly `100.0` when `written == total`.
pub fn format_percent(written: u64, total: Option<u64>) -> Option<String> {
    let total = total.filter(|&t| t > 0)?;
    let tenths = u128::from(written) * 1000 / u128::from(total);
    Some(format!("{}.{}", tenths / 10, tenths % 10))
}
