//! Analysis Orchestrator — drives one analysis request from the first progress
//! event to exactly one terminal event.
//!
//! Flow: started → type-specific stages → analyzing → processing (1..=3 attempts)
//!       → formatting → completed, or error from any point.
//!
//! The type-specific stages are pacing for the client UI. Only the search call
//! (company), the question set call (mock_interview) and the analysis call do work.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis::events::{
    EventSink, ProgressEvent, ANALYZING, FORMATTING, PROCESSING_BASE, PROCESSING_STATUS,
    PROCESSING_STEP, STARTED,
};
use crate::analysis::formatter::format_result;
use crate::analysis::interview::{QuestionCategory, QuestionSet, QuestionSetError};
use crate::analysis::models::{AnalysisKind, AnalysisRequest};
use crate::analysis::prompts::{append_context, build_prompts, build_question_set_prompts};
use crate::analysis::validation::{validate, AnalysisResult, ValidationError};
use crate::llm_client::{strip_json_fences, ChatMessage, CompletionModel, LlmError};
use crate::search::{company_query, render_context, SearchProvider};

/// Model attempts per analysis before the last failure is reported.
pub const MAX_ANALYSIS_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("AI service error: {0}")]
    Llm(#[from] LlmError),

    #[error("AI response was not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("AI response was incomplete: {0}")]
    Schema(#[from] ValidationError),

    #[error("AI response was not a usable question set: {0}")]
    InvalidQuestions(#[from] QuestionSetError),

    #[error("Failed to generate interview questions: {0}")]
    QuestionSet(#[source] Box<AnalysisError>),

    #[error("Failed to encode analysis result: {0}")]
    Encode(#[source] serde_json::Error),
}

pub struct Orchestrator {
    model: Arc<dyn CompletionModel>,
    search: Option<Arc<dyn SearchProvider>>,
    stage_delay: Duration,
}

impl Orchestrator {
    pub fn new(
        model: Arc<dyn CompletionModel>,
        search: Option<Arc<dyn SearchProvider>>,
        stage_delay: Duration,
    ) -> Self {
        Self {
            model,
            search,
            stage_delay,
        }
    }

    /// Runs the pipeline, writing every event to `sink`. Always ends with exactly
    /// one `completed` or `error` event.
    pub async fn run(&self, request: AnalysisRequest, sink: EventSink) {
        let request_id = Uuid::new_v4();
        let span = info_span!("analysis", %request_id, kind = %request.kind());

        async {
            info!(position = request.position(), "Analysis started");
            match self.execute(&request, &sink).await {
                Ok(result) => {
                    info!("Analysis completed");
                    sink.emit(ProgressEvent::completed(result)).await;
                }
                Err(e) => {
                    error!("Analysis failed: {e}");
                    sink.emit(ProgressEvent::error(e.to_string())).await;
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        request: &AnalysisRequest,
        sink: &EventSink,
    ) -> Result<Value, AnalysisError> {
        self.step(sink, STARTED.event()).await;

        let mut search_context = None;
        match request {
            AnalysisRequest::Resume { position, .. } => {
                self.step(sink, stage("scanning", "Scanning resume content", 10, "file-search"))
                    .await;
                self.step(
                    sink,
                    stage("extracting", "Extracting skills and experience", 20, "list-checks"),
                )
                .await;
                self.step(
                    sink,
                    stage(
                        "matching",
                        format!("Matching against {position} requirements"),
                        30,
                        "target",
                    ),
                )
                .await;
            }
            AnalysisRequest::Company {
                company, position, ..
            } => {
                let researching = format!("Researching {company}");
                self.step(sink, stage("researching", researching, 10, "building"))
                    .await;
                self.step(
                    sink,
                    stage("searching", "Searching for recent company information", 20, "globe"),
                )
                .await;
                search_context = self.search_company(company, position).await;
                self.step(sink, stage("gathering", "Gathering company insights", 30, "layers"))
                    .await;
            }
            AnalysisRequest::MockInterview { content, position } => {
                self.step(sink, stage("reviewing", "Reviewing your background", 10, "user"))
                    .await;
                self.step(
                    sink,
                    stage(
                        "generating_questions",
                        "Generating interview questions",
                        20,
                        "message-circle",
                    ),
                )
                .await;
                let questions = self.generate_questions(content, position).await?;
                let questions = serde_json::to_value(&questions).map_err(AnalysisError::Encode)?;
                self.step(
                    sink,
                    stage("questions_ready", "Interview questions ready", 30, "clipboard-list")
                        .with_result(questions),
                )
                .await;
            }
        }

        self.step(sink, ANALYZING.event()).await;

        let prompts = build_prompts(request);
        let user = match &search_context {
            Some(context) => append_context(&prompts.user, context),
            None => prompts.user,
        };
        let message = processing_message(request, search_context.is_some());

        let result = self
            .analyze_with_retry(request.kind(), &prompts.system, &user, message, sink)
            .await?;

        let formatted =
            serde_json::to_value(format_result(&result)).map_err(AnalysisError::Encode)?;
        self.step(sink, FORMATTING.event()).await;

        Ok(formatted)
    }

    /// Calls the model until a completion decodes into the schema for `kind`,
    /// emitting one `processing` event per attempt.
    async fn analyze_with_retry(
        &self,
        kind: AnalysisKind,
        system: &str,
        user: &str,
        message: &str,
        sink: &EventSink,
    ) -> Result<AnalysisResult, AnalysisError> {
        let messages = [ChatMessage::user(user)];
        let mut attempt = 1;

        loop {
            sink.emit(processing_event(message, attempt)).await;

            match self.attempt_analysis(kind, system, &messages).await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < MAX_ANALYSIS_ATTEMPTS => {
                    warn!(attempt, "Analysis attempt failed, retrying: {e}");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt_analysis(
        &self,
        kind: AnalysisKind,
        system: &str,
        messages: &[ChatMessage],
    ) -> Result<AnalysisResult, AnalysisError> {
        let text = self.model.complete(system, messages).await?;
        let value: Value = serde_json::from_str(strip_json_fences(&text))?;
        Ok(validate(kind, &value)?)
    }

    /// Requests the mock interview question set, retrying bad completions the
    /// same number of times as the analysis call. No events are emitted per attempt.
    async fn generate_questions(
        &self,
        content: &str,
        position: &str,
    ) -> Result<QuestionSet, AnalysisError> {
        let prompts = build_question_set_prompts(content, position);
        let messages = [ChatMessage::user(prompts.user)];
        let mut attempt = 1;

        let questions = loop {
            match self.attempt_questions(&prompts.system, &messages).await {
                Ok(questions) => break questions,
                Err(e) if attempt < MAX_ANALYSIS_ATTEMPTS => {
                    warn!(attempt, "Question set attempt failed, retrying: {e}");
                    attempt += 1;
                }
                Err(e) => return Err(AnalysisError::QuestionSet(Box::new(e))),
            }
        };

        info!(
            total = questions.questions.len(),
            coding = questions.count(QuestionCategory::Coding),
            attempt,
            "Interview questions generated"
        );
        Ok(questions)
    }

    async fn attempt_questions(
        &self,
        system: &str,
        messages: &[ChatMessage],
    ) -> Result<QuestionSet, AnalysisError> {
        let text = self.model.complete(system, messages).await?;
        let value: Value = serde_json::from_str(strip_json_fences(&text))?;
        Ok(QuestionSet::from_value(&value)?)
    }

    /// Best-effort web search. Any failure degrades to "no extra context".
    async fn search_company(&self, company: &str, position: &str) -> Option<String> {
        let search = self.search.as_ref()?;
        match search.search(&company_query(company, position)).await {
            Ok(documents) => render_context(&documents),
            Err(e) => {
                warn!("Company search failed, continuing without web context: {e}");
                None
            }
        }
    }

    async fn step(&self, sink: &EventSink, event: ProgressEvent) {
        sink.emit(event).await;
        if !self.stage_delay.is_zero() {
            tokio::time::sleep(self.stage_delay).await;
        }
    }
}

fn stage(status: &str, message: impl Into<String>, progress: u8, icon: &str) -> ProgressEvent {
    ProgressEvent::stage(status, message, progress, icon)
}

fn processing_message(request: &AnalysisRequest, has_search_context: bool) -> &'static str {
    match request {
        AnalysisRequest::Resume { .. } => "Evaluating resume against role requirements",
        AnalysisRequest::Company { .. } if has_search_context => "Analyzing search results",
        AnalysisRequest::Company { .. } => "Analyzing available information",
        AnalysisRequest::MockInterview { .. } => "Evaluating interview readiness",
    }
}

fn processing_event(message: &str, attempt: u32) -> ProgressEvent {
    let bump = PROCESSING_STEP.saturating_mul((attempt - 1).min(u8::MAX as u32) as u8);
    let message = if attempt > 1 {
        format!("{message} (attempt {attempt} of {MAX_ANALYSIS_ATTEMPTS})")
    } else {
        message.to_string()
    };
    stage(
        PROCESSING_STATUS,
        message,
        PROCESSING_BASE.saturating_add(bump),
        "cpu",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::events::{STATUS_COMPLETED, STATUS_ERROR};
    use crate::analysis::interview::fixtures as interview_fixtures;
    use crate::analysis::prompts::{MOCK_INTERVIEW_SYSTEM, QUESTION_SET_SYSTEM, RESUME_SYSTEM};
    use crate::analysis::validation::fixtures;
    use crate::search::SearchResultDocument;
    use crate::test_support::{FailingSearch, ScriptedModel, StaticSearch};
    use serde_json::json;
    use tokio::sync::mpsc;

    async fn run_collect(
        orchestrator: &Orchestrator,
        request: AnalysisRequest,
    ) -> Vec<ProgressEvent> {
        let (tx, mut rx) = mpsc::channel(64);
        orchestrator.run(request, EventSink::new(tx)).await;
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    fn orchestrator(
        model: Arc<ScriptedModel>,
        search: Option<Arc<dyn SearchProvider>>,
    ) -> Orchestrator {
        Orchestrator::new(model, search, Duration::ZERO)
    }

    fn resume_request() -> AnalysisRequest {
        AnalysisRequest::Resume {
            content: "5 years React, led design system".into(),
            position: "Frontend Engineer".into(),
        }
    }

    fn company_request() -> AnalysisRequest {
        AnalysisRequest::Company {
            company: "Acme".into(),
            position: "PM".into(),
            content: None,
        }
    }

    fn statuses(events: &[ProgressEvent]) -> Vec<&str> {
        events.iter().map(|e| e.status.as_str()).collect()
    }

    fn assert_single_terminal_last(events: &[ProgressEvent]) {
        let terminal: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
        assert_eq!(terminal.len(), 1, "exactly one terminal event");
        assert!(events.last().unwrap().is_terminal(), "terminal event is last");
    }

    fn assert_progress_non_decreasing(events: &[ProgressEvent]) {
        let progress: Vec<u8> = events
            .iter()
            .filter(|e| e.status != STATUS_ERROR)
            .map(|e| e.progress)
            .collect();
        assert!(progress.windows(2).all(|w| w[0] <= w[1]), "{progress:?}");
    }

    #[tokio::test]
    async fn test_resume_success_stream() {
        let model = ScriptedModel::new(vec![Ok(fixtures::resume().to_string())]);
        let events = run_collect(&orchestrator(model.clone(), None), resume_request()).await;

        assert_eq!(
            statuses(&events),
            vec![
                "started",
                "scanning",
                "extracting",
                "matching",
                "analyzing",
                "processing",
                "formatting",
                "completed"
            ]
        );
        assert_single_terminal_last(&events);
        assert_progress_non_decreasing(&events);

        let last = events.last().unwrap();
        assert_eq!(last.progress, 100);
        let result = last.result.as_ref().unwrap();
        for key in ["overview", "alignment", "ats", "feedback"] {
            assert!(result.get(key).is_some(), "missing {key}");
        }

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.starts_with(RESUME_SYSTEM));
        assert!(calls[0].1.contains("Frontend Engineer"));
    }

    #[tokio::test]
    async fn test_fenced_completion_is_accepted() {
        let fenced = format!("```json\n{}\n```", fixtures::resume());
        let model = ScriptedModel::new(vec![Ok(fenced)]);
        let events = run_collect(&orchestrator(model, None), resume_request()).await;
        assert_eq!(events.last().unwrap().status, STATUS_COMPLETED);
    }

    #[tokio::test]
    async fn test_retries_until_valid() {
        let model = ScriptedModel::new(vec![
            Ok("not json".into()),
            Ok(json!({"overall_score": "high"}).to_string()),
            Ok(fixtures::resume().to_string()),
        ]);
        let events = run_collect(&orchestrator(model.clone(), None), resume_request()).await;

        let processing: Vec<_> = events
            .iter()
            .filter(|e| e.status == PROCESSING_STATUS)
            .collect();
        assert_eq!(processing.len(), 3);
        assert_eq!(
            processing.iter().map(|e| e.progress).collect::<Vec<_>>(),
            vec![50, 60, 70]
        );
        assert!(processing[2].message.ends_with("(attempt 3 of 3)"));
        assert_eq!(model.calls().len(), 3);
        assert_eq!(events.last().unwrap().status, STATUS_COMPLETED);
        assert_progress_non_decreasing(&events);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_ends_in_error() {
        let model = ScriptedModel::new(vec![
            Ok("{oops".into()),
            Ok("{oops".into()),
            Ok("{oops".into()),
        ]);
        let events = run_collect(&orchestrator(model.clone(), None), resume_request()).await;

        assert_single_terminal_last(&events);
        let last = events.last().unwrap();
        assert_eq!(last.status, STATUS_ERROR);
        assert_eq!(last.progress, 0);
        assert!(last.result.is_none());
        assert!(last.message.contains("not valid JSON"));
        assert_eq!(model.calls().len(), MAX_ANALYSIS_ATTEMPTS as usize);
        assert!(!statuses(&events).contains(&"formatting"));
    }

    #[tokio::test]
    async fn test_model_errors_are_retried() {
        let model = ScriptedModel::new(vec![
            Err(LlmError::Api {
                status: 400,
                message: "bad request".into(),
            }),
            Ok(fixtures::resume().to_string()),
        ]);
        let events = run_collect(&orchestrator(model.clone(), None), resume_request()).await;
        assert_eq!(model.calls().len(), 2);
        assert_eq!(events.last().unwrap().status, STATUS_COMPLETED);
    }

    #[tokio::test]
    async fn test_schema_failure_reported_after_exhaustion() {
        let wrong = json!({"overall_score": 80}).to_string();
        let model = ScriptedModel::new(vec![Ok(wrong.clone()), Ok(wrong.clone()), Ok(wrong)]);
        let events = run_collect(&orchestrator(model, None), resume_request()).await;
        let last = events.last().unwrap();
        assert_eq!(last.status, STATUS_ERROR);
        assert!(last.message.contains("incomplete"));
    }

    #[tokio::test]
    async fn test_company_search_outage_is_silent() {
        let model = ScriptedModel::new(vec![Ok(fixtures::company().to_string())]);
        let search: Arc<dyn SearchProvider> = Arc::new(FailingSearch);
        let orchestrator = orchestrator(model.clone(), Some(search));
        let events = run_collect(&orchestrator, company_request()).await;

        let processing = events
            .iter()
            .find(|e| e.status == PROCESSING_STATUS)
            .unwrap();
        assert_eq!(processing.message, "Analyzing available information");
        assert!(!model.calls()[0].1.contains("Recent information found on the web"));
        assert_eq!(events.last().unwrap().status, STATUS_COMPLETED);
        assert_single_terminal_last(&events);
        assert_progress_non_decreasing(&events);
    }

    #[tokio::test]
    async fn test_company_search_context_is_appended() {
        let model = ScriptedModel::new(vec![Ok(fixtures::company().to_string())]);
        let search = Arc::new(StaticSearch::new(vec![SearchResultDocument {
            title: "Acme raises Series C".into(),
            snippet: "Acme announced funding".into(),
            url: "https://news.test/acme".into(),
        }]));
        let provider: Arc<dyn SearchProvider> = search.clone();
        let orchestrator = orchestrator(model.clone(), Some(provider));
        let events = run_collect(&orchestrator, company_request()).await;

        let processing = events
            .iter()
            .find(|e| e.status == PROCESSING_STATUS)
            .unwrap();
        assert_eq!(processing.message, "Analyzing search results");
        assert!(model.calls()[0].1.contains("Acme raises Series C"));
        assert_eq!(search.queries(), vec!["Acme company PM culture news".to_string()]);
        assert_eq!(
            statuses(&events)[..4],
            ["started", "researching", "searching", "gathering"]
        );
        assert_single_terminal_last(&events);
        assert_progress_non_decreasing(&events);
    }

    #[tokio::test]
    async fn test_company_without_search_configured() {
        let model = ScriptedModel::new(vec![Ok(fixtures::company().to_string())]);
        let events = run_collect(&orchestrator(model, None), company_request()).await;
        let processing = events
            .iter()
            .find(|e| e.status == PROCESSING_STATUS)
            .unwrap();
        assert_eq!(processing.message, "Analyzing available information");
        assert_progress_non_decreasing(&events);
    }

    #[tokio::test]
    async fn test_mock_interview_emits_questions_then_analysis() {
        let model = ScriptedModel::new(vec![
            Ok(interview_fixtures::question_set().to_string()),
            Ok(fixtures::mock_interview().to_string()),
        ]);
        let request = AnalysisRequest::MockInterview {
            content: "Backend developer, 3 years Go".into(),
            position: "SRE".into(),
        };
        let events = run_collect(&orchestrator(model.clone(), None), request).await;

        assert_eq!(
            statuses(&events),
            vec![
                "started",
                "reviewing",
                "generating_questions",
                "questions_ready",
                "analyzing",
                "processing",
                "formatting",
                "completed"
            ]
        );
        let questions = events[3].result.as_ref().unwrap();
        assert_eq!(questions["questions"].as_array().unwrap().len(), 2);
        assert_single_terminal_last(&events);
        assert_progress_non_decreasing(&events);

        let calls = model.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].0.starts_with(QUESTION_SET_SYSTEM));
        let result = events.last().unwrap().result.as_ref().unwrap();
        assert_eq!(result["readiness"]["score"], 64.0);
    }

    #[tokio::test]
    async fn test_mock_interview_question_failure_is_terminal() {
        let empty = json!({"questions": []}).to_string();
        let model = ScriptedModel::new(vec![
            Ok(empty.clone()),
            Ok("Sure! Here are your questions".into()),
            Ok(empty),
        ]);
        let request = AnalysisRequest::MockInterview {
            content: "Backend developer".into(),
            position: "SRE".into(),
        };
        let events = run_collect(&orchestrator(model.clone(), None), request).await;

        assert_single_terminal_last(&events);
        let last = events.last().unwrap();
        assert_eq!(last.status, STATUS_ERROR);
        assert!(last.message.starts_with("Failed to generate interview questions"));
        assert!(last.message.contains("question set is empty"));
        assert_eq!(model.calls().len(), MAX_ANALYSIS_ATTEMPTS as usize);
        assert!(!statuses(&events).contains(&"questions_ready"));
        assert!(!statuses(&events).contains(&PROCESSING_STATUS));
    }

    #[tokio::test]
    async fn test_mock_interview_recovers_from_bad_question_reply() {
        let model = ScriptedModel::new(vec![
            Ok("Sure! Here are your questions".into()),
            Ok(interview_fixtures::question_set().to_string()),
            Ok(fixtures::mock_interview().to_string()),
        ]);
        let request = AnalysisRequest::MockInterview {
            content: "Backend developer".into(),
            position: "SRE".into(),
        };
        let events = run_collect(&orchestrator(model.clone(), None), request).await;

        assert_single_terminal_last(&events);
        assert_progress_non_decreasing(&events);
        assert_eq!(events.last().unwrap().status, STATUS_COMPLETED);
        assert_eq!(
            statuses(&events)
                .iter()
                .filter(|s| *s == &"generating_questions")
                .count(),
            1
        );

        let calls = model.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].0.starts_with(QUESTION_SET_SYSTEM));
        assert_eq!(calls[0], calls[1]);
        assert!(calls[2].0.starts_with(MOCK_INTERVIEW_SYSTEM));
    }

    #[test]
    fn test_processing_event_progress_per_attempt() {
        assert_eq!(processing_event("m", 1).progress, 50);
        assert_eq!(processing_event("m", 1).message, "m");
        assert_eq!(processing_event("m", 2).progress, 60);
        assert_eq!(processing_event("m", 3).progress, 70);
    }
}
