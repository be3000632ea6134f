// src/portfolios/handlers/mod.rs

pub mod ingest;
pub mod portfolios;

pub use ingest::{create_portfolio, ingest_portfolio};
pub use portfolios::{
    get_portfolio, list_portfolios, resolve_portfolio_template, update_case_study,
    update_template,
};
