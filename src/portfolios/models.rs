// src/portfolios/models.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

// ============================================================================
// Nested portfolio structures (stored as JSON text columns)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub position: Option<String>,
    pub company: Option<String>,
    pub duration: Option<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanPhase {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    #[serde(default)]
    pub items: Vec<String>,
}

/// 30-60-90 day plan. Exposed to Zapier under the wire name `plan_30_60_90`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_30: Option<PlanPhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_60: Option<PlanPhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_90: Option<PlanPhase>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub metric: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseStudy {
    pub headline: Option<String>,
    pub challenge: Option<String>,
    pub solution: Option<String>,
    pub role: Option<String>,
    pub actions: Option<String>,
    pub obstacles: Option<String>,
    pub metrics: Option<String>,
    pub impact: Option<String>,
    #[serde(default)]
    pub results: Vec<CaseResult>,
}

// ============================================================================
// Portfolio record (the `salespeople` table)
// ============================================================================

/// Raw database row; nested collections are JSON text
#[derive(Debug, Clone, FromRow)]
pub struct PortfolioRow {
    pub id: String,
    pub full_name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub resume_url: Option<String>,
    pub summary: Option<String>,
    pub skills: Option<String>,
    pub achievements: Option<String>,
    pub hobbies: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub day_plan: Option<String>,
    pub case_study: Option<String>,
    pub template: String,
    pub created_by: Option<String>,
    pub created_date: String,
    pub updated_date: String,
}

/// API-facing portfolio with nested collections decoded
#[derive(Debug, Clone, Serialize)]
pub struct Portfolio {
    pub id: String,
    pub full_name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub resume_url: Option<String>,
    pub summary: Option<String>,
    pub skills: Vec<String>,
    pub achievements: Vec<String>,
    pub hobbies: Vec<String>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_plan: Option<DayPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_study: Option<CaseStudy>,
    pub template: String,
    pub created_by: Option<String>,
    pub created_date: String,
    pub updated_date: String,
}

fn decode_list<T: serde::de::DeserializeOwned>(column: Option<&str>) -> Vec<T> {
    column
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default()
}

fn decode_object<T: serde::de::DeserializeOwned>(column: Option<&str>) -> Option<T> {
    column.and_then(|raw| serde_json::from_str(raw).ok())
}

impl PortfolioRow {
    pub fn into_portfolio(self) -> Portfolio {
        Portfolio {
            skills: decode_list(self.skills.as_deref()),
            achievements: decode_list(self.achievements.as_deref()),
            hobbies: decode_list(self.hobbies.as_deref()),
            experience: decode_list(self.experience.as_deref()),
            education: decode_list(self.education.as_deref()),
            day_plan: decode_object(self.day_plan.as_deref()),
            case_study: decode_object(self.case_study.as_deref()),
            id: self.id,
            full_name: self.full_name,
            title: self.title,
            email: self.email,
            phone: self.phone,
            photo_url: self.photo_url,
            resume_url: self.resume_url,
            summary: self.summary,
            template: self.template,
            created_by: self.created_by,
            created_date: self.created_date,
            updated_date: self.updated_date,
        }
    }
}

// ============================================================================
// Draft (extraction output merged with upload URLs, edited client-side)
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioDraft {
    pub full_name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub resume_url: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    pub day_plan: Option<DayPlan>,
    pub case_study: Option<CaseStudy>,
    pub template: Option<String>,
}

impl PortfolioDraft {
    /// Merge extracted fields with the two upload URLs. Extracted fields win
    /// for everything they cover; the URLs are always taken from the uploads.
    pub fn from_extraction(output: &Value, photo_url: String, resume_url: String) -> Self {
        let mut draft: PortfolioDraft =
            serde_json::from_value(output.clone()).unwrap_or_default();
        draft.photo_url = Some(photo_url);
        draft.resume_url = Some(resume_url);
        draft
    }
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    pub template: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCaseStudyRequest {
    pub case_study: Option<CaseStudy>,
}

// ============================================================================
// Extraction schema
// ============================================================================

/// Field descriptor handed to the extraction service, mirroring the
/// portfolio record's persisted shape.
pub fn extraction_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "full_name": { "type": "string" },
            "title": { "type": "string" },
            "email": { "type": "string" },
            "phone": { "type": "string" },
            "summary": { "type": "string" },
            "skills": { "type": "array", "items": { "type": "string" } },
            "achievements": { "type": "array", "items": { "type": "string" } },
            "hobbies": { "type": "array", "items": { "type": "string" } },
            "experience": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "position": { "type": "string" },
                        "company": { "type": "string" },
                        "duration": { "type": "string" },
                        "achievements": { "type": "array", "items": { "type": "string" } }
                    }
                }
            },
            "education": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "degree": { "type": "string" },
                        "institution": { "type": "string" },
                        "year": { "type": "string" }
                    }
                }
            }
        }
    })
}
