// src/candidates/handlers.rs

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::{AuthedUser, ServiceCaller};
use crate::common::{generate_candidate_id, generate_interview_id, ApiError, AppState, Validator};

use super::models::*;
use super::validators::{CandidateValidator, InterviewValidator};

async fn fetch_candidate(
    db: &sqlx::SqlitePool,
    candidate_id: &str,
) -> Result<Candidate, ApiError> {
    sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE id = ?")
        .bind(candidate_id)
        .fetch_optional(db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Candidate not found".to_string()))
}

async fn fetch_interview(
    db: &sqlx::SqlitePool,
    interview_id: &str,
) -> Result<Interview, ApiError> {
    sqlx::query_as::<_, Interview>("SELECT * FROM interviews WHERE id = ?")
        .bind(interview_id)
        .fetch_optional(db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Interview not found".to_string()))
}

// ============================================================================
// Candidate Handlers
// ============================================================================

/// POST /api/candidates - Insert a scored candidate
///
/// Only the external scoring agent calls this, under the service identity.
/// The trust score is always recomputed server-side from the five parts;
/// a caller-supplied total is never trusted.
pub async fn create_candidate(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _caller: ServiceCaller,
    Json(request): Json<CreateCandidateRequest>,
) -> Result<(StatusCode, Json<Candidate>), ApiError> {
    let validation = CandidateValidator.validate(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let state = state_lock.read().await;

    let candidate_id = generate_candidate_id();
    let trust_score = compute_trust_score(
        request.career_consistency_score,
        request.skill_proof_score,
        request.role_alignment_score,
        request.professional_presence_score,
        request.data_completeness_score,
    );

    sqlx::query(
        r#"
        INSERT INTO candidates (
            id, full_name, email, phone, location, summary,
            career_consistency_score, skill_proof_score, role_alignment_score,
            professional_presence_score, data_completeness_score,
            trust_score, risk_level, created_date, updated_date
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'), datetime('now'))
        "#,
    )
    .bind(&candidate_id)
    .bind(&request.full_name)
    .bind(&request.email)
    .bind(&request.phone)
    .bind(&request.location)
    .bind(&request.summary)
    .bind(request.career_consistency_score)
    .bind(request.skill_proof_score)
    .bind(request.role_alignment_score)
    .bind(request.professional_presence_score)
    .bind(request.data_completeness_score)
    .bind(trust_score)
    .bind(&request.risk_level)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(
        candidate_id = %candidate_id,
        trust_score = trust_score,
        "Candidate created from scoring agent"
    );

    let candidate = fetch_candidate(&state.db, &candidate_id).await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

/// GET /api/candidates - List candidates, highest trust first
pub async fn list_candidates(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
) -> Result<Json<Vec<Candidate>>, ApiError> {
    let state = state_lock.read().await;

    let candidates = sqlx::query_as::<_, Candidate>(
        "SELECT * FROM candidates ORDER BY trust_score DESC, created_date DESC",
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(candidates))
}

/// GET /api/candidates/:id - Fetch one candidate
pub async fn get_candidate(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Path(candidate_id): Path<String>,
) -> Result<Json<Candidate>, ApiError> {
    let state = state_lock.read().await;
    let candidate = fetch_candidate(&state.db, &candidate_id).await?;
    Ok(Json(candidate))
}

// ============================================================================
// Interview Handlers
// ============================================================================

/// GET /api/candidates/:id/interviews - Interviews for one candidate
pub async fn get_candidate_interviews(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Path(candidate_id): Path<String>,
) -> Result<Json<Vec<Interview>>, ApiError> {
    let state = state_lock.read().await;

    // 404 for unknown candidates rather than an empty list
    fetch_candidate(&state.db, &candidate_id).await?;

    let interviews = sqlx::query_as::<_, Interview>(
        "SELECT * FROM interviews WHERE candidate_id = ? ORDER BY created_date DESC",
    )
    .bind(&candidate_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(interviews))
}

/// POST /api/interviews - Schedule an interview
pub async fn create_interview(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Json(request): Json<CreateInterviewRequest>,
) -> Result<(StatusCode, Json<Interview>), ApiError> {
    let validation = InterviewValidator.validate(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let state = state_lock.read().await;

    // The candidate must exist before anything can be scheduled against it
    fetch_candidate(&state.db, &request.candidate_id).await?;

    let interview_id = generate_interview_id();

    sqlx::query(
        r#"
        INSERT INTO interviews (
            id, candidate_id, scheduled_at, interviewer, interview_type,
            status, created_date, updated_date
        ) VALUES (?, ?, ?, ?, ?, 'scheduled', datetime('now'), datetime('now'))
        "#,
    )
    .bind(&interview_id)
    .bind(&request.candidate_id)
    .bind(&request.scheduled_at)
    .bind(&request.interviewer)
    .bind(&request.interview_type)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(
        interview_id = %interview_id,
        candidate_id = %request.candidate_id,
        "Interview scheduled"
    );

    let interview = fetch_interview(&state.db, &interview_id).await?;
    Ok((StatusCode::CREATED, Json(interview)))
}

/// PUT /api/interviews/:id - Update scheduling details or record the outcome
///
/// Status never advances on its own; completing an interview is always an
/// explicit update from the client.
pub async fn update_interview(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Path(interview_id): Path<String>,
    Json(request): Json<UpdateInterviewRequest>,
) -> Result<Json<Interview>, ApiError> {
    let validation = InterviewValidator.validate(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let state = state_lock.read().await;

    let existing = fetch_interview(&state.db, &interview_id).await?;

    let strengths = if request.strengths.is_empty() {
        existing.strengths.clone()
    } else {
        serde_json::to_string(&request.strengths).ok()
    };
    let concerns = if request.concerns.is_empty() {
        existing.concerns.clone()
    } else {
        serde_json::to_string(&request.concerns).ok()
    };

    sqlx::query(
        r#"
        UPDATE interviews SET
            scheduled_at = COALESCE(?, scheduled_at),
            interviewer = COALESCE(?, interviewer),
            interview_type = COALESCE(?, interview_type),
            status = COALESCE(?, status),
            rating = COALESCE(?, rating),
            recommendation = COALESCE(?, recommendation),
            strengths = ?,
            concerns = ?,
            notes = COALESCE(?, notes),
            updated_date = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(&request.scheduled_at)
    .bind(&request.interviewer)
    .bind(&request.interview_type)
    .bind(&request.status)
    .bind(request.rating)
    .bind(&request.recommendation)
    .bind(&strengths)
    .bind(&concerns)
    .bind(&request.notes)
    .bind(&interview_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(interview_id = %interview_id, "Interview updated");

    let interview = fetch_interview(&state.db, &interview_id).await?;
    Ok(Json(interview))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_state() -> Arc<RwLock<AppState>> {
        Arc::new(RwLock::new(AppState::for_tests().await))
    }

    fn reviewer() -> AuthedUser {
        AuthedUser {
            id: "U_TEST01".to_string(),
            email: "owner@example.com".to_string(),
        }
    }

    fn scored_candidate() -> CreateCandidateRequest {
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

    #[tokio::test]
    async fn test_create_candidate_recomputes_trust_score() {
        let state = test_state().await;

        let (status, created) = create_candidate(
            Extension(state),
            ServiceCaller,
            Json(scored_candidate()),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.0.trust_score, Some(75));
        assert!(created.0.id.starts_with("C_"));
    }

    #[tokio::test]
    async fn test_create_candidate_rejects_out_of_range_score() {
        let state = test_state().await;
        let mut request = scored_candidate();
        request.skill_proof_score = 30;

        let result = create_candidate(Extension(state), ServiceCaller, Json(request)).await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_interview_lifecycle() {
        let state = test_state().await;

        let (_, candidate) = create_candidate(
            Extension(state.clone()),
            ServiceCaller,
            Json(scored_candidate()),
        )
        .await
        .unwrap();

        let (status, interview) = create_interview(
            Extension(state.clone()),
            reviewer(),
            Json(CreateInterviewRequest {
                candidate_id: candidate.0.id.clone(),
                scheduled_at: Some("2026-09-01 14:00:00".to_string()),
                interviewer: Some("Sam".to_string()),
                interview_type: Some("screen".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(interview.0.status, "scheduled");

        let updated = update_interview(
            Extension(state.clone()),
            reviewer(),
            Path(interview.0.id.clone()),
            Json(UpdateInterviewRequest {
                scheduled_at: None,
                interviewer: None,
                interview_type: None,
                status: Some("completed".to_string()),
                rating: Some(4),
                recommendation: Some("yes".to_string()),
                strengths: vec!["Discovery questions".to_string()],
                concerns: vec![],
                notes: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.0.status, "completed");
        assert_eq!(updated.0.rating, Some(4));
        assert!(updated.0.strengths.as_deref().unwrap().contains("Discovery"));

        let listed = get_candidate_interviews(
            Extension(state),
            reviewer(),
            Path(candidate.0.id.clone()),
        )
        .await
        .unwrap();
        assert_eq!(listed.0.len(), 1);
    }

    #[tokio::test]
    async fn test_interview_requires_existing_candidate() {
        let state = test_state().await;

        let result = create_interview(
            Extension(state),
            reviewer(),
            Json(CreateInterviewRequest {
                candidate_id: "C_MISSING".to_string(),
                scheduled_at: None,
                interviewer: None,
                interview_type: None,
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
