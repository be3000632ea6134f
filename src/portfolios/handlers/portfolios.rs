// src/portfolios/handlers/portfolios.rs

use axum::{
    extract::{Extension, Path},
    response::Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};
use crate::portfolios::models::{
    Portfolio, PortfolioRow, UpdateCaseStudyRequest, UpdateTemplateRequest,
};
use crate::portfolios::templates::{resolve_template, TemplateKey, TemplateResolution};

async fn fetch_portfolio_row(
    db: &sqlx::SqlitePool,
    portfolio_id: &str,
) -> Result<PortfolioRow, ApiError> {
    sqlx::query_as::<_, PortfolioRow>("SELECT * FROM salespeople WHERE id = ?")
        .bind(portfolio_id)
        .fetch_optional(db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Portfolio not found".to_string()))
}

/// GET /api/portfolios - List portfolios for the dashboard
pub async fn list_portfolios(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
) -> Result<Json<Vec<Portfolio>>, ApiError> {
    let state = state_lock.read().await;

    let rows = sqlx::query_as::<_, PortfolioRow>(
        "SELECT * FROM salespeople ORDER BY created_date DESC",
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(rows.into_iter().map(PortfolioRow::into_portfolio).collect()))
}

/// GET /api/portfolios/:id - Fetch one portfolio (public share page)
pub async fn get_portfolio(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(portfolio_id): Path<String>,
) -> Result<Json<Portfolio>, ApiError> {
    let state = state_lock.read().await;
    let row = fetch_portfolio_row(&state.db, &portfolio_id).await?;
    Ok(Json(row.into_portfolio()))
}

/// GET /api/portfolios/:id/template - Resolve the record's template
///
/// Unknown keys come back as an explicit error state with a recovery action,
/// never as a crash or a silent default.
pub async fn resolve_portfolio_template(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(portfolio_id): Path<String>,
) -> Result<Json<TemplateResolution>, ApiError> {
    let state = state_lock.read().await;
    let row = fetch_portfolio_row(&state.db, &portfolio_id).await?;
    Ok(Json(resolve_template(Some(&row.template))))
}

/// PUT /api/portfolios/:id/template - Change the template
///
/// This is also the recovery action for unknown template keys: the client
/// issues it with the default key to self-heal the record.
pub async fn update_template(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Path(portfolio_id): Path<String>,
    Json(request): Json<UpdateTemplateRequest>,
) -> Result<Json<Portfolio>, ApiError> {
    let state = state_lock.read().await;

    let template = TemplateKey::parse(&request.template).ok_or_else(|| {
        ApiError::BadRequest(format!("Unknown template key: {}", request.template))
    })?;

    let result = sqlx::query(
        "UPDATE salespeople SET template = ?, updated_date = datetime('now') WHERE id = ?",
    )
    .bind(template.as_str())
    .bind(&portfolio_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Portfolio not found".to_string()));
    }

    info!(portfolio_id = %portfolio_id, template = %template.as_str(), "Template updated");

    // Read back so the caller sees exactly what the next fetch will return
    let row = fetch_portfolio_row(&state.db, &portfolio_id).await?;
    Ok(Json(row.into_portfolio()))
}

/// PUT /api/portfolios/:id/case-study - Edit or clear the case study
pub async fn update_case_study(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Path(portfolio_id): Path<String>,
    Json(request): Json<UpdateCaseStudyRequest>,
) -> Result<Json<Portfolio>, ApiError> {
    let state = state_lock.read().await;

    let case_study = request
        .case_study
        .as_ref()
        .and_then(|c| serde_json::to_string(c).ok());

    let result = sqlx::query(
        "UPDATE salespeople SET case_study = ?, updated_date = datetime('now') WHERE id = ?",
    )
    .bind(&case_study)
    .bind(&portfolio_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Portfolio not found".to_string()));
    }

    info!(portfolio_id = %portfolio_id, "Case study updated");

    let row = fetch_portfolio_row(&state.db, &portfolio_id).await?;
    Ok(Json(row.into_portfolio()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolios::templates::resolve_template;

    async fn test_state() -> Arc<RwLock<AppState>> {
        Arc::new(RwLock::new(AppState::for_tests().await))
    }

    fn owner() -> AuthedUser {
        AuthedUser {
            id: "U_TEST01".to_string(),
            email: "owner@example.com".to_string(),
        }
    }

    async fn insert_portfolio(state: &Arc<RwLock<AppState>>, id: &str, template: &str) {
        let guard = state.read().await;
        sqlx::query(
            "INSERT INTO salespeople (id, full_name, template) VALUES (?, 'Jane Doe', ?)",
        )
        .bind(id)
        .bind(template)
        .execute(&guard.db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_get_missing_portfolio_returns_not_found() {
        let state = test_state().await;
        let result = get_portfolio(
            Extension(state),
            Path("does-not-exist".to_string()),
        )
        .await;
        match result {
            Err(ApiError::NotFound(msg)) => assert_eq!(msg, "Portfolio not found"),
            other => panic!("expected NotFound, got {:?}", other.is_ok()),
        }
    }

    #[tokio::test]
    async fn test_template_change_is_visible_on_refetch() {
        let state = test_state().await;
        insert_portfolio(&state, "P_TEST01", "executive").await;

        let updated = update_template(
            Extension(state.clone()),
            owner(),
            Path("P_TEST01".to_string()),
            Json(UpdateTemplateRequest {
                template: "bold".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.0.template, "bold");

        let fetched = get_portfolio(Extension(state), Path("P_TEST01".to_string()))
            .await
            .unwrap();
        assert_eq!(fetched.0.template, "bold");
    }

    #[tokio::test]
    async fn test_unknown_template_key_is_rejected() {
        let state = test_state().await;
        insert_portfolio(&state, "P_TEST01", "executive").await;

        let result = update_template(
            Extension(state),
            owner(),
            Path("P_TEST01".to_string()),
            Json(UpdateTemplateRequest {
                template: "vaporwave".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_stale_template_resolves_to_recovery_and_reset_heals() {
        let state = test_state().await;
        // A key that was valid once but is no longer in the registry
        insert_portfolio(&state, "P_TEST01", "vaporwave").await;

        let resolution = resolve_portfolio_template(
            Extension(state.clone()),
            Path("P_TEST01".to_string()),
        )
        .await
        .unwrap();
        assert!(matches!(
            resolution.0,
            TemplateResolution::TemplateError { .. }
        ));

        // The recovery action is an ordinary template update to the default
        update_template(
            Extension(state.clone()),
            owner(),
            Path("P_TEST01".to_string()),
            Json(UpdateTemplateRequest {
                template: "executive".to_string(),
            }),
        )
        .await
        .unwrap();

        let healed = resolve_portfolio_template(Extension(state), Path("P_TEST01".to_string()))
            .await
            .unwrap();
        assert_eq!(healed.0, resolve_template(Some("executive")));
    }

    #[tokio::test]
    async fn test_case_study_can_be_cleared() {
        let state = test_state().await;
        insert_portfolio(&state, "P_TEST01", "executive").await;

        let with_study = update_case_study(
            Extension(state.clone()),
            owner(),
            Path("P_TEST01".to_string()),
            Json(UpdateCaseStudyRequest {
                case_study: Some(crate::portfolios::models::CaseStudy {
                    headline: Some("Closed the whale".to_string()),
                    ..Default::default()
                }),
            }),
        )
        .await
        .unwrap();
        assert!(with_study.0.case_study.is_some());

        let cleared = update_case_study(
            Extension(state),
            owner(),
            Path("P_TEST01".to_string()),
            Json(UpdateCaseStudyRequest { case_study: None }),
        )
        .await
        .unwrap();
        assert!(cleared.0.case_study.is_none());
    }
}
