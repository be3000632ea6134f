// src/exports/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

pub fn exports_routes() -> Router {
    Router::new()
        .route("/api/portfolios/:id/pdf", post(handlers::export_pdf))
        .route("/api/portfolios/:id/summary", get(handlers::export_summary))
        .route("/api/portfolios/:id/images", post(handlers::export_images))
        .route("/api/downloads", post(handlers::track_download))
        .route("/api/admin/downloads", get(handlers::list_downloads))
}
