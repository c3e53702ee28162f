//! Result Validator — decodes a model completion into the typed schema for its
//! analysis kind. A result is valid iff it decodes; extra fields are tolerated.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::analysis::models::AnalysisKind;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{kind} result must be a JSON object")]
    NotAnObject { kind: AnalysisKind },

    #[error("{kind} result does not match the expected schema: {source}")]
    Schema {
        kind: AnalysisKind,
        #[source]
        source: serde_json::Error,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// resume
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub overall_score: f64,
    pub key_strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub role_alignment: RoleAlignment,
    pub ats_optimization: AtsOptimization,
    pub detailed_feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAlignment {
    pub score: f64,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsOptimization {
    pub score: f64,
    pub suggestions: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// company
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyAnalysis {
    pub company_overview: CompanyOverview,
    pub role_insights: RoleInsights,
    pub interview_preparation: InterviewPreparation,
    pub key_talking_points: Vec<String>,
    pub recent_developments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyOverview {
    pub name: String,
    pub industry: String,
    pub description: String,
    pub culture: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleInsights {
    pub responsibilities: Vec<String>,
    pub required_skills: Vec<String>,
    pub growth_opportunities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewPreparation {
    pub likely_questions: Vec<String>,
    pub tips: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// mock_interview
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockInterviewAnalysis {
    pub readiness_score: f64,
    pub technical_questions: Vec<PracticeQuestion>,
    pub behavioral_questions: Vec<PracticeQuestion>,
    pub focus_areas: Vec<String>,
    pub preparation_tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeQuestion {
    pub question: String,
    pub key_points: Vec<String>,
    pub hints: Vec<String>,
}

/// A validated raw result, discriminated by analysis kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisResult {
    Resume(ResumeAnalysis),
    Company(CompanyAnalysis),
    MockInterview(MockInterviewAnalysis),
}

/// Decodes `value` into the schema for `kind`.
pub fn validate(kind: AnalysisKind, value: &Value) -> Result<AnalysisResult, ValidationError> {
    if !value.is_object() {
        return Err(ValidationError::NotAnObject { kind });
    }

    match kind {
        AnalysisKind::Resume => decode(kind, value).map(AnalysisResult::Resume),
        AnalysisKind::Company => decode(kind, value).map(AnalysisResult::Company),
        AnalysisKind::MockInterview => decode(kind, value).map(AnalysisResult::MockInterview),
    }
}

/// Boolean form of [`validate`]. Never panics.
pub fn is_valid(kind: AnalysisKind, value: &Value) -> bool {
    validate(kind, value).is_ok()
}

fn decode<T: DeserializeOwned>(kind: AnalysisKind, value: &Value) -> Result<T, ValidationError> {
    T::deserialize(value).map_err(|source| ValidationError::Schema { kind, source })
}
