// src/portfolios/mod.rs
//
// Portfolio domain: the salesperson record, the resume ingestion pipeline,
// and the template registry.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod templates;

pub use routes::portfolios_routes;
