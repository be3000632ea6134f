// src/exports/mod.rs
//
// Export surface: direct PDF with print fallback, the summary slide deck,
// section capture to images, and download tracking.

pub mod capture;
pub mod handlers;
pub mod routes;
pub mod summary;

pub use routes::exports_routes;
