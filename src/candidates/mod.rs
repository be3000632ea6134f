// src/candidates/mod.rs
//
// Candidate evaluation: trust-scored candidate records submitted by the
// scoring agent, plus interview scheduling and outcome tracking.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

pub use routes::candidates_routes;
