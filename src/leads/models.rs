// src/leads/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lead {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub source: Option<String>,
    pub created_date: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateLeadRequest {
    pub email: String,
    pub name: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PackageInquiry {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub package: String,
    pub message: Option<String>,
    pub created_date: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateInquiryRequest {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub package: String,
    pub message: Option<String>,
}
