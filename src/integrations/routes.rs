// src/integrations/routes.rs

use axum::{routing::post, Router};

use super::zapier;

pub fn integrations_routes() -> Router {
    Router::new()
        .route(
            "/api/zapier",
            post(zapier::zapier_post).get(zapier::zapier_get),
        )
        .route(
            "/api/zapier/portfolio",
            post(zapier::zapier_portfolio_post).get(zapier::zapier_portfolio_get),
        )
        .route("/api/zapier/send-portfolio", post(zapier::send_portfolio))
        .route("/api/zapier/send-candidate", post(zapier::send_candidate))
        .route("/api/candidates/:id/brief", post(zapier::generate_brief))
}
