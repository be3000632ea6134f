// src/leads/mod.rs
//
// Marketing capture: leads from the landing page and package inquiries.

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::leads_routes;
