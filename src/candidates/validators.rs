// src/candidates/validators.rs

use super::models::*;
use crate::common::{ValidationResult, Validator};
use std::collections::HashSet;

// ============================================================================
// Candidate Validators
// ============================================================================

pub struct CandidateValidator;

impl Validator<CreateCandidateRequest> for CandidateValidator {
    fn validate(&self, data: &CreateCandidateRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.full_name.trim().is_empty() {
            result.add_error("full_name", "Full name is required");
        }

        if let Some(email) = &data.email {
            if !email.trim().is_empty() && !email.contains('@') {
                result.add_error("email", "Email must be a valid email address");
            }
        }

        let scores = [
            (
                "career_consistency_score",
                data.career_consistency_score,
                MAX_CAREER_CONSISTENCY,
            ),
            ("skill_proof_score", data.skill_proof_score, MAX_SKILL_PROOF),
            (
                "role_alignment_score",
                data.role_alignment_score,
                MAX_ROLE_ALIGNMENT,
            ),
            (
                "professional_presence_score",
                data.professional_presence_score,
                MAX_PROFESSIONAL_PRESENCE,
            ),
            (
                "data_completeness_score",
                data.data_completeness_score,
                MAX_DATA_COMPLETENESS,
            ),
        ];
        for (field, value, max) in scores {
            if value < 0 || value > max {
                result.add_error(field, &format!("Score must be between 0 and {}", max));
            }
        }

        if let Some(risk) = &data.risk_level {
            if !RISK_LEVELS.contains(&risk.as_str()) {
                result.add_error("risk_level", "Risk level must be Green, Yellow or Red");
            }
        }

        result
    }
}

// ============================================================================
// Interview Validators
// ============================================================================

pub struct InterviewValidator;

impl Validator<CreateInterviewRequest> for InterviewValidator {
    fn validate(&self, data: &CreateInterviewRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.candidate_id.trim().is_empty() {
            result.add_error("candidate_id", "Candidate ID is required");
        }

        result
    }
}

impl Validator<UpdateInterviewRequest> for InterviewValidator {
    fn validate(&self, data: &UpdateInterviewRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(status) = &data.status {
            let valid_statuses = HashSet::from(INTERVIEW_STATUSES);
            if !valid_statuses.contains(status.as_str()) {
                result.add_error("status", "Invalid interview status");
            }
        }

        if let Some(rating) = data.rating {
            if !(1..=5).contains(&rating) {
                result.add_error("rating", "Rating must be between 1 and 5");
            }
        }

        if let Some(recommendation) = &data.recommendation {
            let valid_recommendations = HashSet::from(RECOMMENDATIONS);
            if !valid_recommendations.contains(recommendation.as_str()) {
                result.add_error("recommendation", "Invalid recommendation");
            }
        }

        if let Some(notes) = &data.notes {
            if notes.len() > 5000 {
                result.add_error("notes", "Notes must be less than 5000 characters");
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_candidate() -> CreateCandidateRequest {
        CreateCandidateRequest {
            full_name: "Jordan Reyes".to_string(),
            email: Some("jordan@example.com".to_string()),
            phone: None,
            location: None,
            summary: None,
            career_consistency_score: 20,
            skill_proof_score: 18,
            role_alignment_score: 15,
            professional_presence_score: 12,
            data_completeness_score: 10,
            risk_level: Some("Green".to_string()),
        }
    }

    #[test]
    fn test_valid_candidate_passes() {
        let result = CandidateValidator.validate(&base_candidate());
        assert!(result.is_valid);
    }

    #[test]
    fn test_score_out_of_range_rejected() {
        let mut data = base_candidate();
        data.career_consistency_score = 26;
        let result = CandidateValidator.validate(&data);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "career_consistency_score");
    }

    #[test]
    fn test_unknown_risk_level_rejected() {
        let mut data = base_candidate();
        data.risk_level = Some("Purple".to_string());
        let result = CandidateValidator.validate(&data);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_interview_rating_bounds() {
        let data = UpdateInterviewRequest {
            scheduled_at: None,
            interviewer: None,
            interview_type: None,
            status: Some("completed".to_string()),
            rating: Some(6),
            recommendation: Some("yes".to_string()),
            strengths: vec![],
            concerns: vec![],
            notes: None,
        };
        let result = InterviewValidator.validate(&data);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "rating");
    }

    #[test]
    fn test_interview_status_must_be_known() {
        let data = UpdateInterviewRequest {
            scheduled_at: None,
            interviewer: None,
            interview_type: None,
            status: Some("ghosted".to_string()),
            rating: None,
            recommendation: None,
            strengths: vec![],
            concerns: vec![],
            notes: None,
        };
        let result = InterviewValidator.validate(&data);
        assert!(!result.is_valid);
    }
}
