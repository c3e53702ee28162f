//! Axum route handler for the streamed analysis endpoint.

use std::convert::Infallible;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::warn;

use crate::analysis::events::{EventSink, ProgressEvent};
use crate::analysis::models::{AnalysisRequest, AnalysisRequestBody};
use crate::errors::AppError;
use crate::state::AppState;

/// Events buffered between the pipeline task and the response body.
const EVENT_BUFFER: usize = 32;

/// POST /api/flowgpt
///
/// Validates the request synchronously (400 on missing fields), then streams
/// newline-delimited progress events from a spawned pipeline task.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequestBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload.map_err(|rejection| {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    })?;
    let request = AnalysisRequest::from_body(body)?;

    let orchestrator = state
        .orchestrator
        .clone()
        .ok_or(AppError::NotConfigured("Language model provider"))?;

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    tokio::spawn(async move {
        orchestrator.run(request, EventSink::new(tx)).await;
    });

    Ok(event_stream_response(rx))
}

fn event_stream_response(mut rx: mpsc::Receiver<ProgressEvent>) -> Response {
    let stream = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            match event.to_line() {
                Ok(line) => yield Ok::<Bytes, Infallible>(Bytes::from(line)),
                Err(e) => warn!("Dropping unserializable progress event: {e}"),
            }
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    (headers, Body::from_stream(stream)).into_response()
}
