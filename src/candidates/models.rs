// src/candidates/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Candidate Models
// ============================================================================

/// Maximum value of each score dimension; they sum to the 0-100 trust score
pub const MAX_CAREER_CONSISTENCY: i64 = 25;
pub const MAX_SKILL_PROOF: i64 = 25;
pub const MAX_ROLE_ALIGNMENT: i64 = 20;
pub const MAX_PROFESSIONAL_PRESENCE: i64 = 15;
pub const MAX_DATA_COMPLETENESS: i64 = 15;

pub const RISK_LEVELS: [&str; 3] = ["Green", "Yellow", "Red"];

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub summary: Option<String>,
    pub career_consistency_score: Option<i64>,
    pub skill_proof_score: Option<i64>,
    pub role_alignment_score: Option<i64>,
    pub professional_presence_score: Option<i64>,
    pub data_completeness_score: Option<i64>,
    pub trust_score: Option<i64>,
    pub risk_level: Option<String>,
    pub created_date: String,
    pub updated_date: String,
}

/// Sum the five score parts into the 0-100 trust score, clamping each part
/// to its dimension maximum
pub fn compute_trust_score(
    career_consistency: i64,
    skill_proof: i64,
    role_alignment: i64,
    professional_presence: i64,
    data_completeness: i64,
) -> i64 {
    career_consistency.clamp(0, MAX_CAREER_CONSISTENCY)
        + skill_proof.clamp(0, MAX_SKILL_PROOF)
        + role_alignment.clamp(0, MAX_ROLE_ALIGNMENT)
        + professional_presence.clamp(0, MAX_PROFESSIONAL_PRESENCE)
        + data_completeness.clamp(0, MAX_DATA_COMPLETENESS)
}

/// Submitted by the external scoring agent under the service identity
#[derive(Debug, Deserialize)]
pub struct CreateCandidateRequest {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub summary: Option<String>,
    pub career_consistency_score: i64,
    pub skill_proof_score: i64,
    pub role_alignment_score: i64,
    pub professional_presence_score: i64,
    pub data_completeness_score: i64,
    pub risk_level: Option<String>,
}

// ============================================================================
// Interview Models
// ============================================================================

pub const INTERVIEW_STATUSES: [&str; 4] = ["scheduled", "completed", "cancelled", "no_show"];
pub const RECOMMENDATIONS: [&str; 5] = ["strong_yes", "yes", "maybe", "no", "strong_no"];

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Interview {
    pub id: String,
    pub candidate_id: String,
    pub scheduled_at: Option<String>,
    pub interviewer: Option<String>,
    pub interview_type: Option<String>,
    pub status: String,
    pub rating: Option<i64>,
    pub recommendation: Option<String>,
    /// JSON array of free-text strengths
    pub strengths: Option<String>,
    /// JSON array of free-text concerns
    pub concerns: Option<String>,
    pub notes: Option<String>,
    pub created_date: String,
    pub updated_date: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateInterviewRequest {
    pub candidate_id: String,
    pub scheduled_at: Option<String>,
    pub interviewer: Option<String>,
    pub interview_type: Option<String>,
}

/// Full update of an interview: scheduling changes and evaluation results.
/// Status transitions are manual only; nothing advances automatically.
#[derive(Debug, Deserialize)]
pub struct UpdateInterviewRequest {
    pub scheduled_at: Option<String>,
    pub interviewer: Option<String>,
    pub interview_type: Option<String>,
    pub status: Option<String>,
    pub rating: Option<i64>,
    pub recommendation: Option<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trust_score_sums_parts() {
        assert_eq!(compute_trust_score(25, 25, 20, 15, 15), 100);
        assert_eq!(compute_trust_score(10, 10, 10, 10, 10), 50);
        assert_eq!(compute_trust_score(0, 0, 0, 0, 0), 0);
    }

    #[test]
    fn test_trust_score_clamps_out_of_range_parts() {
        // Over-maximum parts are clamped to their dimension max
        assert_eq!(compute_trust_score(100, 100, 100, 100, 100), 100);
        // Negative parts count as zero
        assert_eq!(compute_trust_score(-5, 25, 20, 15, 15), 75);
    }
}
