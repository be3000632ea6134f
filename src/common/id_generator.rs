// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., P_K7NP3X for portfolios)
//!
//! Benefits:
//! - No ambiguous characters (excludes I, L, O, U)
//! - Case-insensitive
//! - ~1 billion combinations per entity type (32^6)
//! - Easy to read, type, and communicate verbally

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// Salesperson portfolio (P_)
    Portfolio,
    /// Candidate (C_)
    Candidate,
    /// Interview (V_) - V for interView; I is not in the alphabet anyway
    Interview,
    /// Lead (L_)
    Lead,
    /// Portfolio download record (D_)
    Download,
    /// Package inquiry (Q_) - Q for Question
    Inquiry,
    /// User (U_)
    User,
    /// Uploaded asset (G_) - G for Graphic/General asset
    Asset,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Portfolio => "P",
            EntityPrefix::Candidate => "C",
            EntityPrefix::Interview => "V",
            EntityPrefix::Lead => "L",
            EntityPrefix::Download => "D",
            EntityPrefix::Inquiry => "Q",
            EntityPrefix::User => "U",
            EntityPrefix::Asset => "G",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID using Crockford Base32 encoding
///
/// Returns a string in format "PREFIX_XXXXXX" (e.g., "P_K7NP3X")
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(6))
}

/// Generate a raw Crockford Base32 string without prefix
/// Useful for filenames or other non-entity identifiers
pub fn generate_raw_id(length: usize) -> String {
    generate_crockford_string(length)
}

// ============================================================================
// Convenience functions for each entity type
// ============================================================================

/// Generate a Portfolio ID (P_XXXXXX)
pub fn generate_portfolio_id() -> String {
    generate_id(EntityPrefix::Portfolio)
}

/// Generate a Candidate ID (C_XXXXXX)
pub fn generate_candidate_id() -> String {
    generate_id(EntityPrefix::Candidate)
}

/// Generate an Interview ID (V_XXXXXX)
pub fn generate_interview_id() -> String {
    generate_id(EntityPrefix::Interview)
}

/// Generate a Lead ID (L_XXXXXX)
pub fn generate_lead_id() -> String {
    generate_id(EntityPrefix::Lead)
}

/// Generate a Download record ID (D_XXXXXX)
pub fn generate_download_id() -> String {
    generate_id(EntityPrefix::Download)
}

/// Generate a Package Inquiry ID (Q_XXXXXX)
pub fn generate_inquiry_id() -> String {
    generate_id(EntityPrefix::Inquiry)
}

/// Generate a User ID (U_XXXXXX)
pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

/// Generate an Asset ID (G_XXXXXX)
pub fn generate_asset_id() -> String {
    generate_id(EntityPrefix::Asset)
}
