//! Client Poller — submits one analysis request and consumes the progress stream.
//!
//! Reading stops at the first terminal event. An `error` event becomes
//! `ClientError::Analysis`; the caller decides how to surface it.

pub mod decoder;
pub mod state;

use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::analysis::events::ProgressEvent;
use crate::analysis::models::AnalysisRequestBody;

pub use decoder::LineDecoder;
pub use state::{fold_events, PollState};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("Malformed progress event: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    #[error("Progress event is not valid UTF-8: {0}")]
    InvalidText(#[from] std::string::FromUtf8Error),

    #[error("Stream ended before the analysis finished")]
    Incomplete,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct FlowClient {
    http: Client,
    endpoint: String,
}

impl FlowClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            endpoint: format!("{}/api/flowgpt", base_url.trim_end_matches('/')),
        }
    }

    /// Runs one analysis. `observer` sees every event together with the state it produced.
    pub async fn analyze<F>(
        &self,
        body: &AnalysisRequestBody,
        mut observer: F,
    ) -> Result<Value, ClientError>
    where
        F: FnMut(&ProgressEvent, &PollState),
    {
        let response = self.http.post(&self.endpoint).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.to_string(),
            };
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let mut stream = response.bytes_stream();
        let mut decoder = LineDecoder::default();
        let mut state = PollState::Idle;

        while let Some(chunk) = stream.next().await {
            for line in decoder.push(&chunk?)? {
                if let Some(result) = advance(&mut state, &line, &mut observer)? {
                    return Ok(result);
                }
            }
        }

        if let Some(line) = decoder.finish()? {
            if let Some(result) = advance(&mut state, &line, &mut observer)? {
                return Ok(result);
            }
        }

        Err(ClientError::Incomplete)
    }
}

/// Applies one line to `state`. Returns the result once the analysis has succeeded.
fn advance<F>(
    state: &mut PollState,
    line: &str,
    observer: &mut F,
) -> Result<Option<Value>, ClientError>
where
    F: FnMut(&ProgressEvent, &PollState),
{
    let event: ProgressEvent = serde_json::from_str(line)?;
    *state = std::mem::take(state).apply(&event);
    observer(&event, state);

    match state {
        PollState::Succeeded(result) => Ok(Some(result.clone())),
        PollState::Failed(message) => Err(ClientError::Analysis(message.clone())),
        PollState::Idle | PollState::InProgress { .. } => Ok(None),
    }
}
