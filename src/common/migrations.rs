// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Run all database migrations
///
/// Tables are created if missing; nothing is dropped unless RESET_DB=true.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("RESET_DB=true - dropping all tables and recreating schema");
        drop_all_tables(pool).await?;
    }

    create_core_tables(pool).await?;
    create_portfolio_tables(pool).await?;
    create_candidate_tables(pool).await?;
    create_lead_tables(pool).await?;
    create_system_tables(pool).await?;
    create_indexes(pool).await?;

    // Initialize default settings from environment variables
    init_default_settings(pool).await?;

    info!("Database migration completed successfully");

    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let tables = [
        "portfolio_downloads",
        "package_inquiries",
        "leads",
        "interviews",
        "candidates",
        "salespeople",
        "system_settings",
        "users",
    ];
    for table in tables {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn create_core_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_portfolio_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Nested collections (skills, experience, day_plan, ...) are stored as JSON text
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS salespeople (
            id TEXT PRIMARY KEY,
            full_name TEXT,
            title TEXT,
            email TEXT,
            phone TEXT,
            photo_url TEXT,
            resume_url TEXT,
            summary TEXT,
            skills TEXT,
            achievements TEXT,
            hobbies TEXT,
            experience TEXT,
            education TEXT,
            day_plan TEXT,
            case_study TEXT,
            template TEXT NOT NULL DEFAULT 'executive',
            created_by TEXT,
            created_date TEXT NOT NULL DEFAULT (datetime('now')),
            updated_date TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS portfolio_downloads (
            id TEXT PRIMARY KEY,
            portfolio_id TEXT NOT NULL,
            format TEXT NOT NULL,
            created_date TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_candidate_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS candidates (
            id TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            location TEXT,
            summary TEXT,
            career_consistency_score INTEGER,
            skill_proof_score INTEGER,
            role_alignment_score INTEGER,
            professional_presence_score INTEGER,
            data_completeness_score INTEGER,
            trust_score INTEGER,
            risk_level TEXT,
            created_date TEXT NOT NULL DEFAULT (datetime('now')),
            updated_date TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // candidate_id is a weak reference: relation only, no FK cascade
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS interviews (
            id TEXT PRIMARY KEY,
            candidate_id TEXT NOT NULL,
            scheduled_at TEXT,
            interviewer TEXT,
            interview_type TEXT,
            status TEXT NOT NULL DEFAULT 'scheduled',
            rating INTEGER,
            recommendation TEXT,
            strengths TEXT,
            concerns TEXT,
            notes TEXT,
            created_date TEXT NOT NULL DEFAULT (datetime('now')),
            updated_date TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_lead_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS leads (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            name TEXT,
            source TEXT,
            created_date TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS package_inquiries (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            company TEXT,
            package TEXT NOT NULL,
            message TEXT,
            created_date TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_system_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS system_settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_by TEXT NOT NULL DEFAULT 'system'
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_salespeople_created ON salespeople(created_date)",
        "CREATE INDEX IF NOT EXISTS idx_downloads_portfolio ON portfolio_downloads(portfolio_id)",
        "CREATE INDEX IF NOT EXISTS idx_interviews_candidate ON interviews(candidate_id)",
        "CREATE INDEX IF NOT EXISTS idx_leads_email ON leads(email)",
    ];
    for stmt in indexes {
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}

/// Initialize default system settings from environment variables
/// Only sets values if they don't already exist in the database
async fn init_default_settings(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let settings = vec![
        ("aws_access_key_id", "AWS_ACCESS_KEY_ID"),
        ("aws_secret_access_key", "AWS_SECRET_ACCESS_KEY"),
        ("aws_region", "AWS_REGION"),
        ("aws_s3_bucket_name", "AWS_S3_BUCKET_NAME"),
        ("aws_cloudfront_domain", "AWS_CLOUDFRONT_DOMAIN"),
        ("openai_api_key", "OPENAI_API_KEY"),
        ("openai_model", "OPENAI_MODEL"),
        ("pdf_render_api_key", "PDF_RENDER_API_KEY"),
        ("screenshot_api_key", "SCREENSHOT_API_KEY"),
        ("storage_type", "STORAGE_TYPE"),
    ];

    for (db_key, env_key) in settings {
        if let Ok(value) = env::var(env_key) {
            if !value.is_empty() {
                let existing: Option<(String,)> =
                    sqlx::query_as("SELECT value FROM system_settings WHERE key = ?")
                        .bind(db_key)
                        .fetch_optional(pool)
                        .await?;

                if existing.is_none() {
                    sqlx::query(
                        r#"
                        INSERT INTO system_settings (key, value, updated_at, updated_by)
                        VALUES (?, ?, datetime('now'), 'system')
                        "#,
                    )
                    .bind(db_key)
                    .bind(&value)
                    .execute(pool)
                    .await?;
                    info!(key = %db_key, "Initialized setting from environment");
                }
            }
        }
    }

    Ok(())
}
