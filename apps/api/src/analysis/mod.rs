// Streamed analysis pipeline behind POST /api/flowgpt.
// Implements: request validation, prompt building, model calls with bounded retry,
// result validation and formatting, newline-delimited progress events.
// All model calls go through llm_client::CompletionModel.

pub mod events;
pub mod formatter;
pub mod handlers;
pub mod interview;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod validation;

pub use events::ProgressEvent;
pub use models::{AnalysisKind, AnalysisRequest, AnalysisRequestBody, AnalysisRequestData};
pub use orchestrator::{AnalysisError, Orchestrator};
