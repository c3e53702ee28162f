//! Progress events — one JSON object per line of the analysis response stream.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_ERROR: &str = "error";

/// One line of the analysis stream. `result` is present on `completed` and on
/// `questions_ready`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub status: String,
    pub message: String,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl ProgressEvent {
    pub fn stage(status: &str, message: impl Into<String>, progress: u8, icon: &str) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            progress: progress.min(100),
            icon: Some(icon.to_string()),
            result: None,
        }
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    pub fn completed(result: Value) -> Self {
        Self::stage(STATUS_COMPLETED, "Analysis complete", 100, "check-circle").with_result(result)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::stage(STATUS_ERROR, message, 0, "alert-circle")
    }

    pub fn is_terminal(&self) -> bool {
        self.status == STATUS_COMPLETED || self.status == STATUS_ERROR
    }

    /// Newline-delimited JSON framing.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// A cosmetic pipeline stage with a fixed position in the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub status: &'static str,
    pub message: &'static str,
    pub progress: u8,
    pub icon: &'static str,
}

impl Stage {
    pub fn event(&self) -> ProgressEvent {
        ProgressEvent::stage(self.status, self.message, self.progress, self.icon)
    }
}

pub const STARTED: Stage = Stage {
    status: "started",
    message: "Starting analysis",
    progress: 0,
    icon: "rocket",
};

pub const ANALYZING: Stage = Stage {
    status: "analyzing",
    message: "Analyzing with AI",
    progress: 40,
    icon: "brain",
};

pub const FORMATTING: Stage = Stage {
    status: "formatting",
    message: "Formatting results",
    progress: 90,
    icon: "sparkles",
};

pub const PROCESSING_STATUS: &str = "processing";
/// Progress of the first model attempt; each retry adds `PROCESSING_STEP`.
pub const PROCESSING_BASE: u8 = 50;
pub const PROCESSING_STEP: u8 = 10;

/// Write half of the response stream. Send failures mean the client went away;
/// the pipeline keeps running to completion regardless.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<ProgressEvent>,
}

impl EventSink {
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx }
    }

    pub async fn emit(&self, event: ProgressEvent) {
        if self.tx.send(event).await.is_err() {
            debug!("Progress receiver dropped; continuing without a listener");
        }
    }
}
