// src/candidates/routes.rs

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers;

pub fn candidates_routes() -> Router {
    Router::new()
        .route(
            "/api/candidates",
            post(handlers::create_candidate).get(handlers::list_candidates),
        )
        .route("/api/candidates/:id", get(handlers::get_candidate))
        .route(
            "/api/candidates/:id/interviews",
            get(handlers::get_candidate_interviews),
        )
        .route("/api/interviews", post(handlers::create_interview))
        .route("/api/interviews/:id", put(handlers::update_interview))
}
