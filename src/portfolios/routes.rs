// src/portfolios/routes.rs

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::portfolios::handlers;

pub fn portfolios_routes() -> Router {
    Router::new()
        .route(
            "/api/portfolios",
            post(handlers::create_portfolio).get(handlers::list_portfolios),
        )
        .route("/api/portfolios/ingest", post(handlers::ingest_portfolio))
        .route("/api/portfolios/:id", get(handlers::get_portfolio))
        .route(
            "/api/portfolios/:id/template",
            get(handlers::resolve_portfolio_template).put(handlers::update_template),
        )
        .route(
            "/api/portfolios/:id/case-study",
            put(handlers::update_case_study),
        )
}
