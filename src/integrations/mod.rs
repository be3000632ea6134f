// src/integrations/mod.rs
//
// Outbound integrations: the Zapier action endpoints, direct webhook sends,
// and the candidate career brief.

pub mod payload;
pub mod routes;
pub mod zapier;

pub use routes::integrations_routes;
