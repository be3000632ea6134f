// src/integrations/payload.rs
//
// Outbound webhook payload shaping. Zapier consumers get a fixed field
// allowlist; internal columns never cross the wire, and the 30-60-90 plan
// travels under its historical wire name `plan_30_60_90`.

use serde_json::{json, Value};

use crate::candidates::models::{Candidate, Interview};
use crate::portfolios::models::Portfolio;

/// Shape one portfolio for Zapier. The field set is a contract: additions
/// here ship to every subscribed Zap.
pub fn zapier_portfolio_payload(portfolio: &Portfolio) -> Value {
    // `{}` rather than null when no plan exists, so Zap field mapping
    // never sees a missing object
    let plan = portfolio
        .day_plan
        .as_ref()
        .and_then(|p| serde_json::to_value(p).ok())
        .unwrap_or_else(|| json!({}));

    json!({
        "full_name": portfolio.full_name,
        "title": portfolio.title,
        "email": portfolio.email,
        "phone": portfolio.phone,
        "photo_url": portfolio.photo_url,
        "summary": portfolio.summary,
        "resume_url": portfolio.resume_url,
        "template": portfolio.template,
        "skills": portfolio.skills,
        "achievements": portfolio.achievements,
        "hobbies": portfolio.hobbies,
        "experience": portfolio.experience,
        "education": portfolio.education,
        "plan_30_60_90": plan,
        "case_study": portfolio.case_study,
        "created_date": portfolio.created_date,
        "updated_date": portfolio.updated_date,
        "created_by": portfolio.created_by,
    })
}

/// Shape one candidate for Zapier, optionally with their interview history
pub fn zapier_candidate_payload(candidate: &Candidate, interviews: Option<&[Interview]>) -> Value {
    let mut payload = json!({
        "full_name": candidate.full_name,
        "email": candidate.email,
        "phone": candidate.phone,
        "location": candidate.location,
        "summary": candidate.summary,
        "career_consistency_score": candidate.career_consistency_score,
        "skill_proof_score": candidate.skill_proof_score,
        "role_alignment_score": candidate.role_alignment_score,
        "professional_presence_score": candidate.professional_presence_score,
        "data_completeness_score": candidate.data_completeness_score,
        "trust_score": candidate.trust_score,
        "risk_level": candidate.risk_level,
        "created_date": candidate.created_date,
        "updated_date": candidate.updated_date,
    });

    if let Some(interviews) = interviews {
        if let (Some(object), Ok(value)) =
            (payload.as_object_mut(), serde_json::to_value(interviews))
        {
            object.insert("interviews".to_string(), value);
        }
    }

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolios::models::{DayPlan, PlanPhase};

    fn sample_portfolio() -> Portfolio {
        Portfolio {
            id: "P_SECRET1".to_string(),
            full_name: Some("Jane Doe".to_string()),
            title: Some("Account Executive".to_string()),
            email: Some("jane@example.com".to_string()),
            phone: None,
            photo_url: Some("https://cdn.example.com/photo.jpg".to_string()),
            resume_url: Some("https://cdn.example.com/resume.pdf".to_string()),
            summary: Some("Quota crusher".to_string()),
            skills: vec!["SPIN".to_string()],
            achievements: vec![],
            hobbies: vec![],
            experience: vec![],
            education: vec![],
            day_plan: None,
            case_study: None,
            template: "executive".to_string(),
            created_by: Some("owner@example.com".to_string()),
            created_date: "2026-01-01 00:00:00".to_string(),
            updated_date: "2026-01-02 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_payload_field_allowlist() {
        let payload = zapier_portfolio_payload(&sample_portfolio());
        let object = payload.as_object().unwrap();

        let mut fields: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
        fields.sort_unstable();
        assert_eq!(
            fields,
            vec![
                "achievements",
                "case_study",
                "created_by",
                "created_date",
                "education",
                "email",
                "experience",
                "full_name",
                "hobbies",
                "phone",
                "photo_url",
                "plan_30_60_90",
                "resume_url",
                "skills",
                "summary",
                "template",
                "title",
                "updated_date",
            ]
        );
        // The record id is internal and never crosses the wire
        assert!(!object.contains_key("id"));
        assert!(!object.contains_key("day_plan"));
    }

    #[test]
    fn test_day_plan_renamed_on_the_wire() {
        let mut portfolio = sample_portfolio();
        portfolio.day_plan = Some(DayPlan {
            day_30: Some(PlanPhase {
                title: Some("Learn".to_string()),
                subtitle: None,
                items: vec!["onboard".to_string()],
            }),
            day_60: None,
            day_90: None,
        });

        let payload = zapier_portfolio_payload(&portfolio);
        assert_eq!(payload["plan_30_60_90"]["day_30"]["title"], "Learn");
    }

    #[test]
    fn test_missing_day_plan_becomes_empty_object() {
        let payload = zapier_portfolio_payload(&sample_portfolio());
        assert_eq!(payload["plan_30_60_90"], serde_json::json!({}));
    }

    #[test]
    fn test_candidate_payload_includes_interviews_on_request() {
        let candidate = Candidate {
            id: "C_TEST01".to_string(),
            full_name: "Jordan Reyes".to_string(),
            email: None,
            phone: None,
            location: None,
            summary: None,
            career_consistency_score: Some(20),
            skill_proof_score: Some(18),
            role_alignment_score: Some(15),
            professional_presence_score: Some(12),
            data_completeness_score: Some(10),
            trust_score: Some(75),
            risk_level: Some("Green".to_string()),
            created_date: "2026-01-01 00:00:00".to_string(),
            updated_date: "2026-01-01 00:00:00".to_string(),
        };

        let without = zapier_candidate_payload(&candidate, None);
        assert!(without.get("interviews").is_none());

        let interview = Interview {
            id: "V_TEST01".to_string(),
            candidate_id: "C_TEST01".to_string(),
            scheduled_at: None,
            interviewer: None,
            interview_type: None,
            status: "scheduled".to_string(),
            rating: None,
            recommendation: None,
            strengths: None,
            concerns: None,
            notes: None,
            created_date: "2026-01-01 00:00:00".to_string(),
            updated_date: "2026-01-01 00:00:00".to_string(),
        };
        let with = zapier_candidate_payload(&candidate, Some(&[interview]));
        assert_eq!(with["interviews"].as_array().unwrap().len(), 1);
        assert_eq!(with["trust_score"], 75);
    }
}
