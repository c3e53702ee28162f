//! Mock interview question set — generated by a dedicated model call before the
//! readiness analysis runs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    Technical,
    SystemDesign,
    Behavioral,
    Coding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub id: String,
    pub category: QuestionCategory,
    pub question: String,
    pub difficulty: String,
    pub hints: Vec<String>,
    pub acceptance_criteria: Vec<String>,
    pub follow_ups: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_cases: Vec<TestCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_solution: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub questions: Vec<InterviewQuestion>,
}

#[derive(Debug, Error)]
pub enum QuestionSetError {
    #[error("question set does not match the expected schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("question set is empty")]
    Empty,

    #[error("coding question '{0}' is missing test cases or a sample solution")]
    IncompleteCoding(String),
}

impl QuestionSet {
    /// Decodes and checks a question set. Coding items must be runnable.
    pub fn from_value(value: &Value) -> Result<Self, QuestionSetError> {
        let set = QuestionSet::deserialize(value)?;

        if set.questions.is_empty() {
            return Err(QuestionSetError::Empty);
        }

        if let Some(q) = set.questions.iter().find(|q| {
            q.category == QuestionCategory::Coding
                && (q.test_cases.is_empty()
                    || q.sample_solution.as_deref().map_or(true, |s| s.trim().is_empty()))
        }) {
            return Err(QuestionSetError::IncompleteCoding(q.id.clone()));
        }

        Ok(set)
    }

    pub fn count(&self, category: QuestionCategory) -> usize {
        self.questions
            .iter()
            .filter(|q| q.category == category)
            .count()
    }
}
