// src/integrations/zapier.rs
//
// Zapier-facing webhook surface. Two overlapping action endpoints exist for
// historical reasons and stay separate on purpose: live Zaps are wired to
// both, with slightly different action vocabularies.

use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::auth::{AuthedUser, ServiceCaller};
use crate::candidates::models::{Candidate, Interview};
use crate::common::{safe_url_log, ApiError, AppState};
use crate::portfolios::models::{Portfolio, PortfolioRow};
use crate::services::brief::CareerBriefData;

use super::payload::{zapier_candidate_payload, zapier_portfolio_payload};

const WEBHOOK_URL_SETTING: &str = "zapier_webhook_url";

#[derive(Debug, Deserialize)]
pub struct ZapierRequest {
    pub action: String,
    pub portfolio_id: Option<String>,
    pub webhook_url: Option<String>,
}

async fn fetch_portfolio(
    db: &sqlx::SqlitePool,
    portfolio_id: &str,
) -> Result<Portfolio, ApiError> {
    sqlx::query_as::<_, PortfolioRow>("SELECT * FROM salespeople WHERE id = ?")
        .bind(portfolio_id)
        .fetch_optional(db)
        .await
        .map_err(ApiError::DatabaseError)?
        .map(PortfolioRow::into_portfolio)
        .ok_or_else(|| ApiError::NotFound("Portfolio not found".to_string()))
}

async fn list_portfolio_payloads(state: &AppState) -> Result<Vec<Value>, ApiError> {
    let rows = sqlx::query_as::<_, PortfolioRow>(
        "SELECT * FROM salespeople ORDER BY created_date DESC",
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(rows
        .into_iter()
        .map(|row| zapier_portfolio_payload(&row.into_portfolio()))
        .collect())
}

async fn get_portfolio_payload(state: &AppState, request: &ZapierRequest) -> Result<Value, ApiError> {
    let portfolio_id = request
        .portfolio_id
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("portfolio_id is required".to_string()))?;
    let portfolio = fetch_portfolio(&state.db, portfolio_id).await?;
    Ok(zapier_portfolio_payload(&portfolio))
}

/// POST a payload to a Zapier hook and report the upstream status verbatim
async fn post_to_webhook(
    state: &AppState,
    webhook_url: &str,
    payload: &Value,
) -> Result<Json<Value>, ApiError> {
    let response = state
        .http
        .post(webhook_url)
        .json(payload)
        .send()
        .await
        .map_err(|e| {
            warn!(error = %e, url = %safe_url_log(webhook_url), "Webhook delivery failed");
            ApiError::BadRequest(format!("Webhook delivery failed: {}", e))
        })?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    info!(status = %status, url = %safe_url_log(webhook_url), "Webhook delivered");
    Ok(Json(json!({
        "success": status.is_success(),
        "upstream_status": status.as_u16(),
        "upstream_body": body,
    })))
}

// ============================================================================
// /api/zapier - subscription-era action endpoint
// ============================================================================

async fn zapier_actions(state: &AppState, request: ZapierRequest) -> Result<Json<Value>, ApiError> {
    match request.action.as_str() {
        "list_portfolios" => Ok(Json(json!(list_portfolio_payloads(state).await?))),
        "get_portfolio" => Ok(Json(get_portfolio_payload(state, &request).await?)),
        "subscribe" => {
            let webhook_url = request
                .webhook_url
                .as_deref()
                .ok_or_else(|| ApiError::BadRequest("webhook_url is required".to_string()))?;

            state
                .settings_service
                .set_setting(WEBHOOK_URL_SETTING, webhook_url, "zapier")
                .await
                .map_err(|e| ApiError::InternalServer(e.to_string()))?;

            info!("Zapier subscription registered");
            Ok(Json(json!({"success": true})))
        }
        other => Err(ApiError::BadRequest(format!("Unknown action: {}", other))),
    }
}

pub async fn zapier_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _caller: ServiceCaller,
    Json(request): Json<ZapierRequest>,
) -> Result<Json<Value>, ApiError> {
    let state = state_lock.read().await;
    zapier_actions(&state, request).await
}

pub async fn zapier_get(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _caller: ServiceCaller,
    Query(request): Query<ZapierRequest>,
) -> Result<Json<Value>, ApiError> {
    let state = state_lock.read().await;
    zapier_actions(&state, request).await
}

// ============================================================================
// /api/zapier/portfolio - trigger-era action endpoint
// ============================================================================

async fn zapier_portfolio_actions(
    state: &AppState,
    request: ZapierRequest,
) -> Result<Json<Value>, ApiError> {
    match request.action.as_str() {
        "list_portfolios" => Ok(Json(json!(list_portfolio_payloads(state).await?))),
        "get_portfolio" => Ok(Json(get_portfolio_payload(state, &request).await?)),
        "trigger_webhook" => {
            let payload = get_portfolio_payload(state, &request).await?;

            // Explicit URL wins over the stored subscription
            let webhook_url = match &request.webhook_url {
                Some(url) => url.clone(),
                None => state
                    .settings_service
                    .get_setting(WEBHOOK_URL_SETTING)
                    .await
                    .map_err(|e| ApiError::InternalServer(e.to_string()))?
                    .ok_or_else(|| {
                        ApiError::BadRequest("No webhook URL configured".to_string())
                    })?,
            };

            post_to_webhook(state, &webhook_url, &payload).await
        }
        other => Err(ApiError::BadRequest(format!("Unknown action: {}", other))),
    }
}

pub async fn zapier_portfolio_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _caller: ServiceCaller,
    Json(request): Json<ZapierRequest>,
) -> Result<Json<Value>, ApiError> {
    let state = state_lock.read().await;
    zapier_portfolio_actions(&state, request).await
}

pub async fn zapier_portfolio_get(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _caller: ServiceCaller,
    Query(request): Query<ZapierRequest>,
) -> Result<Json<Value>, ApiError> {
    let state = state_lock.read().await;
    zapier_portfolio_actions(&state, request).await
}

// ============================================================================
// Direct sends
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SendPortfolioRequest {
    pub webhook_url: String,
    pub portfolio_id: String,
}

/// POST /api/zapier/send-portfolio - Push one portfolio to a caller-supplied hook
pub async fn send_portfolio(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _caller: ServiceCaller,
    Json(request): Json<SendPortfolioRequest>,
) -> Result<Json<Value>, ApiError> {
    let state = state_lock.read().await;
    let portfolio = fetch_portfolio(&state.db, &request.portfolio_id).await?;
    let payload = zapier_portfolio_payload(&portfolio);
    post_to_webhook(&state, &request.webhook_url, &payload).await
}

#[derive(Debug, Deserialize)]
pub struct SendCandidateRequest {
    pub webhook_url: String,
    pub candidate_id: String,
    #[serde(default)]
    pub include_interviews: bool,
}

/// POST /api/zapier/send-candidate - Push one scored candidate to a hook
pub async fn send_candidate(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _caller: ServiceCaller,
    Json(request): Json<SendCandidateRequest>,
) -> Result<Json<Value>, ApiError> {
    let state = state_lock.read().await;

    let candidate = sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE id = ?")
        .bind(&request.candidate_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Candidate not found".to_string()))?;

    let interviews = if request.include_interviews {
        Some(
            sqlx::query_as::<_, Interview>(
                "SELECT * FROM interviews WHERE candidate_id = ? ORDER BY created_date DESC",
            )
            .bind(&request.candidate_id)
            .fetch_all(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?,
        )
    } else {
        None
    };

    let payload = zapier_candidate_payload(&candidate, interviews.as_deref());
    post_to_webhook(&state, &request.webhook_url, &payload).await
}

// ============================================================================
// Career brief
// ============================================================================

/// POST /api/candidates/:id/brief - Generate the candidate's career brief PDF
pub async fn generate_brief(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Path(candidate_id): Path<String>,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await;

    let candidate = sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE id = ?")
        .bind(&candidate_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Candidate not found".to_string()))?;

    let data = CareerBriefData {
        full_name: candidate.full_name.clone(),
        email: candidate.email.clone(),
        phone: candidate.phone.clone(),
        location: candidate.location.clone(),
        summary: candidate.summary.clone(),
        career_consistency_score: candidate.career_consistency_score.unwrap_or(0),
        skill_proof_score: candidate.skill_proof_score.unwrap_or(0),
        role_alignment_score: candidate.role_alignment_score.unwrap_or(0),
        professional_presence_score: candidate.professional_presence_score.unwrap_or(0),
        data_completeness_score: candidate.data_completeness_score.unwrap_or(0),
        trust_score: candidate.trust_score.unwrap_or(0),
        risk_level: candidate.risk_level.clone(),
    };

    let pdf = state
        .brief_service
        .generate(&data)
        .map_err(|e| ApiError::InternalServer(format!("Brief generation failed: {}", e)))?;

    info!(candidate_id = %candidate_id, size = pdf.len(), "Career brief generated");

    let disposition = format!(
        "attachment; filename=\"{}_brief.pdf\"",
        candidate
            .full_name
            .replace(|c: char| !c.is_alphanumeric() && c != '-' && c != '_', "_")
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn test_state() -> Arc<RwLock<AppState>> {
        let state = Arc::new(RwLock::new(AppState::for_tests().await));
        {
            let guard = state.read().await;
            sqlx::query(
                r#"
                INSERT INTO salespeople (id, full_name, template)
                VALUES ('P_TEST01', 'Jane Doe', 'executive')
                "#,
            )
            .execute(&guard.db)
            .await
            .unwrap();
        }
        state
    }

    #[tokio::test]
    async fn test_zapier_list_and_get_actions() {
        let state = test_state().await;

        let listed = zapier_post(
            Extension(state.clone()),
            ServiceCaller,
            Json(ZapierRequest {
                action: "list_portfolios".to_string(),
                portfolio_id: None,
                webhook_url: None,
            }),
        )
        .await
        .unwrap();
        let array = listed.0.as_array().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["full_name"], "Jane Doe");

        let fetched = zapier_get(
            Extension(state),
            ServiceCaller,
            Query(ZapierRequest {
                action: "get_portfolio".to_string(),
                portfolio_id: Some("P_TEST01".to_string()),
                webhook_url: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(fetched.0["full_name"], "Jane Doe");
        assert!(fetched.0.get("id").is_none());
    }

    #[tokio::test]
    async fn test_unknown_action_is_rejected_on_both_endpoints() {
        let state = test_state().await;

        let request = || ZapierRequest {
            action: "delete_everything".to_string(),
            portfolio_id: None,
            webhook_url: None,
        };

        let first = zapier_post(Extension(state.clone()), ServiceCaller, Json(request())).await;
        assert!(matches!(first, Err(ApiError::BadRequest(_))));

        let second =
            zapier_portfolio_post(Extension(state), ServiceCaller, Json(request())).await;
        assert!(matches!(second, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_subscribe_stores_webhook_url() {
        let state = test_state().await;

        zapier_post(
            Extension(state.clone()),
            ServiceCaller,
            Json(ZapierRequest {
                action: "subscribe".to_string(),
                portfolio_id: None,
                webhook_url: Some("https://hooks.zapier.com/hooks/catch/1/a".to_string()),
            }),
        )
        .await
        .unwrap();

        let guard = state.read().await;
        let stored = guard
            .settings_service
            .get_setting(WEBHOOK_URL_SETTING)
            .await
            .unwrap();
        assert_eq!(
            stored.as_deref(),
            Some("https://hooks.zapier.com/hooks/catch/1/a")
        );
    }

    #[tokio::test]
    async fn test_brief_is_served_as_pdf() {
        let state = test_state().await;
        {
            let guard = state.read().await;
            sqlx::query(
                r#"
                INSERT INTO candidates (
                    id, full_name, career_consistency_score, skill_proof_score,
                    role_alignment_score, professional_presence_score,
                    data_completeness_score, trust_score, risk_level
                ) VALUES ('C_TEST01', 'Jordan Reyes', 20, 18, 15, 12, 10, 75, 'Green')
                "#,
            )
            .execute(&guard.db)
            .await
            .unwrap();
        }

        let response = generate_brief(
            Extension(state),
            AuthedUser {
                id: "U_TEST01".to_string(),
                email: "owner@example.com".to_string(),
            },
            Path("C_TEST01".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/pdf")
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"%PDF-"));
    }
}
