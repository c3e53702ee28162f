// Prompt Builder: maps an analysis request to a (system, user) prompt pair.
// Templates use `{placeholder}` markers that are filled in a single pass by `fill`.

use crate::analysis::models::AnalysisRequest;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, NO_FABRICATION_INSTRUCTION};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

pub const RESUME_SYSTEM: &str = "You are an expert technical recruiter and resume coach \
    who reviews resumes against a target role and applicant tracking systems.";

pub const COMPANY_SYSTEM: &str = "You are a career research analyst who prepares candidates \
    for interviews by summarizing a company, its culture and what the role demands.";

pub const MOCK_INTERVIEW_SYSTEM: &str = "You are a senior interviewer who assesses a candidate's \
    readiness for a role and prepares targeted practice questions.";

pub const QUESTION_SET_SYSTEM: &str = "You are a hiring manager who writes realistic interview \
    loops with clear evaluation criteria.";

pub const RESUME_PROMPT_TEMPLATE: &str = r#"Review the following resume for the position of {position}.

RESUME:
{content}

Return a JSON object with this EXACT schema:
{
  "overall_score": 0-100,
  "key_strengths": ["..."],
  "improvement_areas": ["..."],
  "role_alignment": {
    "score": 0-100,
    "matching_skills": ["..."],
    "missing_skills": ["..."]
  },
  "ats_optimization": {
    "score": 0-100,
    "suggestions": ["..."]
  },
  "detailed_feedback": "..."
}

Scores are numbers, not strings. List 3-6 items per array where the resume supports it."#;

pub const COMPANY_PROMPT_TEMPLATE: &str = r#"Research {company} for a candidate applying to the position of {position}.
{notes}
Return a JSON object with this EXACT schema:
{
  "company_overview": {
    "name": "{company}",
    "industry": "...",
    "description": "...",
    "culture": ["..."]
  },
  "role_insights": {
    "responsibilities": ["..."],
    "required_skills": ["..."],
    "growth_opportunities": ["..."]
  },
  "interview_preparation": {
    "likely_questions": ["..."],
    "tips": ["..."]
  },
  "key_talking_points": ["..."],
  "recent_developments": ["..."]
}

Use an empty array for recent_developments if nothing recent is known."#;

pub const MOCK_INTERVIEW_PROMPT_TEMPLATE: &str = r#"Assess how prepared this candidate is to interview for the position of {position}.

CANDIDATE BACKGROUND:
{content}

Return a JSON object with this EXACT schema:
{
  "readiness_score": 0-100,
  "technical_questions": [
    {"question": "...", "key_points": ["..."], "hints": ["..."]}
  ],
  "behavioral_questions": [
    {"question": "...", "key_points": ["..."], "hints": ["..."]}
  ],
  "focus_areas": ["..."],
  "preparation_tips": ["..."]
}

Provide 3-5 technical and 2-4 behavioral questions tailored to the background."#;

pub const QUESTION_SET_PROMPT_TEMPLATE: &str = r#"Write a mock interview for the position of {position}.

CANDIDATE BACKGROUND:
{content}

Return a JSON object with this EXACT schema:
{
  "questions": [
    {
      "id": "q1",
      "category": "technical" | "system_design" | "behavioral" | "coding",
      "question": "...",
      "difficulty": "easy" | "medium" | "hard",
      "hints": ["..."],
      "acceptance_criteria": ["..."],
      "follow_ups": ["..."],
      "test_cases": [{"input": "...", "expected_output": "..."}],
      "sample_solution": "..."
    }
  ]
}

Include at least one question of every category. test_cases and sample_solution are
REQUIRED for coding questions and must be omitted for every other category."#;

/// Builds the prompts for the main analysis call.
pub fn build_prompts(request: &AnalysisRequest) -> PromptPair {
    match request {
        AnalysisRequest::Resume { content, position } => PromptPair {
            system: with_json_rule(RESUME_SYSTEM),
            user: fill(
                RESUME_PROMPT_TEMPLATE,
                &[("position", position), ("content", content)],
            ),
        },
        AnalysisRequest::Company {
            company,
            position,
            content,
        } => {
            let notes = match content {
                Some(notes) => format!("\nCANDIDATE NOTES:\n{notes}\n"),
                None => String::new(),
            };
            PromptPair {
                system: with_json_rule(COMPANY_SYSTEM),
                user: format!(
                    "{}\n\n{}",
                    fill(
                        COMPANY_PROMPT_TEMPLATE,
                        &[("company", company), ("position", position), ("notes", &notes)],
                    ),
                    NO_FABRICATION_INSTRUCTION
                ),
            }
        }
        AnalysisRequest::MockInterview { content, position } => PromptPair {
            system: with_json_rule(MOCK_INTERVIEW_SYSTEM),
            user: fill(
                MOCK_INTERVIEW_PROMPT_TEMPLATE,
                &[("position", position), ("content", content)],
            ),
        },
    }
}

/// Builds the prompts for the up-front mock interview question set call.
pub fn build_question_set_prompts(content: &str, position: &str) -> PromptPair {
    PromptPair {
        system: with_json_rule(QUESTION_SET_SYSTEM),
        user: fill(
            QUESTION_SET_PROMPT_TEMPLATE,
            &[("position", position), ("content", content)],
        ),
    }
}

/// Appends search-derived context to a user prompt.
pub fn append_context(user: &str, context: &str) -> String {
    format!("{user}\n\n{context}\nUse this information where it is relevant and reliable.")
}

/// Replaces each `{name}` marker with its value. Inserted text is copied as-is and
/// never scanned again; braces that do not form a known marker are kept.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let marker = vars.iter().find(|(name, _)| {
            after
                .strip_prefix(name)
                .is_some_and(|tail| tail.starts_with('}'))
        });
        match marker {
            Some((name, value)) => {
                out.push_str(value);
                rest = &after[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn with_json_rule(system: &str) -> String {
    format!("{system} {JSON_ONLY_INSTRUCTION}")
}
