// src/leads/routes.rs

use axum::{routing::post, Router};

use super::handlers;

pub fn leads_routes() -> Router {
    Router::new()
        .route("/api/leads", post(handlers::create_lead))
        .route("/api/inquiries", post(handlers::create_inquiry))
}
