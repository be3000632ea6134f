// src/leads/handlers.rs

use axum::{extract::Extension, http::StatusCode, response::Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::common::{
    generate_inquiry_id, generate_lead_id, safe_email_log, ApiError, AppState,
};

use super::models::{CreateInquiryRequest, CreateLeadRequest, Lead, PackageInquiry};

/// POST /api/leads - Capture a marketing lead
///
/// Email uniqueness is a convention checked with a SELECT, not a constraint:
/// a repeat signup returns the existing lead rather than an error.
pub async fn create_lead(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<CreateLeadRequest>,
) -> Result<(StatusCode, Json<Lead>), ApiError> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest("A valid email is required".to_string()));
    }

    let state = state_lock.read().await;

    let existing = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if let Some(lead) = existing {
        info!(email = %safe_email_log(&email), "Lead already captured");
        return Ok((StatusCode::OK, Json(lead)));
    }

    let lead_id = generate_lead_id();
    sqlx::query(
        r#"
        INSERT INTO leads (id, email, name, source, created_date)
        VALUES (?, ?, ?, ?, datetime('now'))
        "#,
    )
    .bind(&lead_id)
    .bind(&email)
    .bind(&request.name)
    .bind(&request.source)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(lead_id = %lead_id, email = %safe_email_log(&email), "Lead captured");

    let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = ?")
        .bind(&lead_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok((StatusCode::CREATED, Json(lead)))
}

/// POST /api/inquiries - Record a package inquiry. Append-only.
pub async fn create_inquiry(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<CreateInquiryRequest>,
) -> Result<(StatusCode, Json<PackageInquiry>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    if !request.email.contains('@') {
        return Err(ApiError::BadRequest("A valid email is required".to_string()));
    }
    if request.package.trim().is_empty() {
        return Err(ApiError::BadRequest("Package is required".to_string()));
    }

    let state = state_lock.read().await;

    let inquiry_id = generate_inquiry_id();
    sqlx::query(
        r#"
        INSERT INTO package_inquiries (id, name, email, company, package, message, created_date)
        VALUES (?, ?, ?, ?, ?, ?, datetime('now'))
        "#,
    )
    .bind(&inquiry_id)
    .bind(&request.name)
    .bind(&request.email)
    .bind(&request.company)
    .bind(&request.package)
    .bind(&request.message)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(
        inquiry_id = %inquiry_id,
        package = %request.package,
        "Package inquiry recorded"
    );

    let inquiry = sqlx::query_as::<_, PackageInquiry>(
        "SELECT * FROM package_inquiries WHERE id = ?",
    )
    .bind(&inquiry_id)
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok((StatusCode::CREATED, Json(inquiry)))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_state() -> Arc<RwLock<AppState>> {
        Arc::new(RwLock::new(AppState::for_tests().await))
    }

    #[tokio::test]
    async fn test_repeat_signup_returns_existing_lead() {
        let state = test_state().await;

        let (first_status, first) = create_lead(
            Extension(state.clone()),
            Json(CreateLeadRequest {
                email: "Buyer@Example.com".to_string(),
                name: Some("Buyer".to_string()),
                source: Some("landing".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(first_status, StatusCode::CREATED);
        // Emails are normalized before the uniqueness check
        assert_eq!(first.0.email, "buyer@example.com");

        let (second_status, second) = create_lead(
            Extension(state),
            Json(CreateLeadRequest {
                email: "buyer@example.com".to_string(),
                name: None,
                source: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(second_status, StatusCode::OK);
        assert_eq!(second.0.id, first.0.id);
    }

    #[tokio::test]
    async fn test_lead_requires_plausible_email() {
        let state = test_state().await;
        let result = create_lead(
            Extension(state),
            Json(CreateLeadRequest {
                email: "not-an-email".to_string(),
                name: None,
                source: None,
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_inquiry_is_recorded() {
        let state = test_state().await;
        let (status, inquiry) = create_inquiry(
            Extension(state),
            Json(CreateInquiryRequest {
                name: "Buyer".to_string(),
                email: "buyer@example.com".to_string(),
                company: Some("Acme".to_string()),
                package: "pro".to_string(),
                message: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(inquiry.0.id.starts_with("Q_"));
        assert_eq!(inquiry.0.package, "pro");
    }
}
