//! Result Formatter — reshapes a validated result into titled sections ready for rendering.

use serde::Serialize;

use crate::analysis::validation::{
    AnalysisResult, CompanyAnalysis, MockInterviewAnalysis, PracticeQuestion, ResumeAnalysis,
};

/// Presentation shape of a completed analysis. Serialized without a tag: the
/// client already knows which kind it asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormattedResult {
    Resume(FormattedResume),
    Company(FormattedCompany),
    MockInterview(FormattedMockInterview),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedResume {
    pub overview: ScoredOverview,
    pub alignment: AlignmentSection,
    pub ats: AtsSection,
    pub feedback: TextSection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredOverview {
    pub title: String,
    pub score: f64,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentSection {
    pub title: String,
    pub score: f64,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtsSection {
    pub title: String,
    pub score: f64,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSection {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSection {
    pub title: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedCompany {
    pub overview: CompanyOverviewSection,
    pub role: RoleSection,
    pub interview: InterviewSection,
    pub talking_points: TalkingPointsSection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyOverviewSection {
    pub title: String,
    pub name: String,
    pub industry: String,
    pub description: String,
    pub culture: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleSection {
    pub title: String,
    pub responsibilities: Vec<String>,
    pub required_skills: Vec<String>,
    pub growth_opportunities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewSection {
    pub title: String,
    pub likely_questions: Vec<String>,
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TalkingPointsSection {
    pub title: String,
    pub points: Vec<String>,
    pub recent_developments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedMockInterview {
    pub readiness: ReadinessSection,
    pub technical: QuestionSection,
    pub behavioral: QuestionSection,
    pub preparation: ListSection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadinessSection {
    pub title: String,
    pub score: f64,
    pub focus_areas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionSection {
    pub title: String,
    pub questions: Vec<PracticeQuestion>,
}

pub fn format_result(result: &AnalysisResult) -> FormattedResult {
    match result {
        AnalysisResult::Resume(r) => FormattedResult::Resume(format_resume(r)),
        AnalysisResult::Company(c) => FormattedResult::Company(format_company(c)),
        AnalysisResult::MockInterview(m) => {
            FormattedResult::MockInterview(format_mock_interview(m))
        }
    }
}

fn format_resume(r: &ResumeAnalysis) -> FormattedResume {
    FormattedResume {
        overview: ScoredOverview {
            title: "Overall Assessment".to_string(),
            score: r.overall_score,
            strengths: r.key_strengths.clone(),
            improvements: r.improvement_areas.clone(),
        },
        alignment: AlignmentSection {
            title: "Role Alignment".to_string(),
            score: r.role_alignment.score,
            matching_skills: r.role_alignment.matching_skills.clone(),
            missing_skills: r.role_alignment.missing_skills.clone(),
        },
        ats: AtsSection {
            title: "ATS Optimization".to_string(),
            score: r.ats_optimization.score,
            suggestions: r.ats_optimization.suggestions.clone(),
        },
        feedback: TextSection {
            title: "Detailed Feedback".to_string(),
            content: r.detailed_feedback.clone(),
        },
    }
}

fn format_company(c: &CompanyAnalysis) -> FormattedCompany {
    FormattedCompany {
        overview: CompanyOverviewSection {
            title: "Company Overview".to_string(),
            name: c.company_overview.name.clone(),
            industry: c.company_overview.industry.clone(),
            description: c.company_overview.description.clone(),
            culture: c.company_overview.culture.clone(),
        },
        role: RoleSection {
            title: "Role Insights".to_string(),
            responsibilities: c.role_insights.responsibilities.clone(),
            required_skills: c.role_insights.required_skills.clone(),
            growth_opportunities: c.role_insights.growth_opportunities.clone(),
        },
        interview: InterviewSection {
            title: "Interview Preparation".to_string(),
            likely_questions: c.interview_preparation.likely_questions.clone(),
            tips: c.interview_preparation.tips.clone(),
        },
        talking_points: TalkingPointsSection {
            title: "Key Talking Points".to_string(),
            points: c.key_talking_points.clone(),
            recent_developments: c.recent_developments.clone(),
        },
    }
}

fn format_mock_interview(m: &MockInterviewAnalysis) -> FormattedMockInterview {
    FormattedMockInterview {
        readiness: ReadinessSection {
            title: "Interview Readiness".to_string(),
            score: m.readiness_score,
            focus_areas: m.focus_areas.clone(),
        },
        technical: QuestionSection {
            title: "Technical Questions".to_string(),
            questions: m.technical_questions.clone(),
        },
        behavioral: QuestionSection {
            title: "Behavioral Questions".to_string(),
            questions: m.behavioral_questions.clone(),
        },
        preparation: ListSection {
            title: "Preparation Tips".to_string(),
            items: m.preparation_tips.clone(),
        },
    }
}
