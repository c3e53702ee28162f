use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Selects prompt templates and the result schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Resume,
    Company,
    MockInterview,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resume => "resume",
            Self::Company => "company",
            Self::MockInterview => "mock_interview",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "resume" => Some(Self::Resume),
            "company" => Some(Self::Company),
            "mock_interview" => Some(Self::MockInterview),
            _ => None,
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire format
// ────────────────────────────────────────────────────────────────────────────

/// Body of `POST /api/flowgpt` exactly as sent. Every field is optional here so
/// that missing fields produce our own 400 messages instead of a rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequestBody {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AnalysisRequestData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequestData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Validated request
// ────────────────────────────────────────────────────────────────────────────

/// A request that passed entry validation. Each variant carries exactly the
/// fields its analysis needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRequest {
    Resume {
        content: String,
        position: String,
    },
    Company {
        company: String,
        position: String,
        /// Optional extra notes from the user.
        content: Option<String>,
    },
    MockInterview {
        content: String,
        position: String,
    },
}

impl AnalysisRequest {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            Self::Resume { .. } => AnalysisKind::Resume,
            Self::Company { .. } => AnalysisKind::Company,
            Self::MockInterview { .. } => AnalysisKind::MockInterview,
        }
    }

    pub fn position(&self) -> &str {
        match self {
            Self::Resume { position, .. }
            | Self::Company { position, .. }
            | Self::MockInterview { position, .. } => position,
        }
    }

    /// Converts the wire body, rejecting the first missing required field.
    pub fn from_body(body: AnalysisRequestBody) -> Result<Self, AppError> {
        let (raw_kind, data) = match (body.kind, body.data) {
            (Some(kind), Some(data)) => (kind, data),
            _ => {
                return Err(AppError::Validation(
                    "Analysis type and data are required".to_string(),
                ))
            }
        };

        let kind = AnalysisKind::parse(raw_kind.trim()).ok_or_else(|| {
            AppError::Validation(format!(
                "Invalid analysis type '{raw_kind}'. Expected one of: resume, company, mock_interview"
            ))
        })?;

        let position = non_blank(data.position)
            .ok_or_else(|| AppError::Validation("Position is required".to_string()))?;
        let content = non_blank(data.content);

        match kind {
            AnalysisKind::Resume => {
                let content = content.ok_or_else(|| {
                    AppError::Validation("Resume content is required for resume analysis".into())
                })?;
                Ok(Self::Resume { content, position })
            }
            AnalysisKind::Company => {
                let company = non_blank(data.company).ok_or_else(|| {
                    AppError::Validation("Company name is required for company research".into())
                })?;
                Ok(Self::Company {
                    company,
                    position,
                    content,
                })
            }
            AnalysisKind::MockInterview => {
                let content = content.ok_or_else(|| {
                    AppError::Validation(
                        "Background content is required for mock interview preparation".into(),
                    )
                })?;
                Ok(Self::MockInterview { content, position })
            }
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
