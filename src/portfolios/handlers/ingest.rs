// src/portfolios/handlers/ingest.rs
//
// Resume ingestion pipeline: accept resume + photo, upload both concurrently,
// run schema-guided extraction, hand back an editable draft. Creation is a
// separate call so a failed save never discards the user's edits.

use axum::{
    extract::{Extension, Multipart},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::auth::AuthedUser;
use crate::common::{generate_asset_id, generate_portfolio_id, ApiError, AppState};
use crate::portfolios::models::{extraction_schema, PortfolioDraft, PortfolioRow};
use crate::portfolios::templates::{TemplateKey, DEFAULT_TEMPLATE};
use crate::services::extraction::{ExtractionError, ExtractionSource};

const RESUME_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];
const PHOTO_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

struct UploadedField {
    filename: String,
    data: Vec<u8>,
}

fn extension_of(filename: &str) -> String {
    filename.rsplit('.').next().unwrap_or("").to_lowercase()
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// POST /api/portfolios/ingest - Run the ingestion pipeline up to the draft
pub async fn ingest_portfolio(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    mut multipart: Multipart,
) -> Result<Json<PortfolioDraft>, ApiError> {
    let state = state_lock.read().await;

    info!(user_id = %authed.id, "Starting portfolio ingestion");

    let mut resume: Option<UploadedField> = None;
    let mut photo: Option<UploadedField> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart body".to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != "resume" && name != "photo" {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|_| ApiError::BadRequest("Invalid file".to_string()))?
            .to_vec();

        let uploaded = UploadedField { filename, data };
        if name == "resume" {
            resume = Some(uploaded);
        } else {
            photo = Some(uploaded);
        }
    }

    // Both files are required before the pipeline runs at all
    let resume = resume
        .ok_or_else(|| ApiError::BadRequest("No resume file provided".to_string()))?;
    let photo = photo
        .ok_or_else(|| ApiError::BadRequest("No photo file provided".to_string()))?;

    let resume_ext = extension_of(&resume.filename);
    if !RESUME_EXTENSIONS.contains(&resume_ext.as_str()) {
        return Err(ApiError::BadRequest(
            "Resume must be a PDF, DOC, or DOCX file".to_string(),
        ));
    }

    let photo_ext = extension_of(&photo.filename);
    if !PHOTO_EXTENSIONS.contains(&photo_ext.as_str()) {
        return Err(ApiError::BadRequest(
            "Photo must be an image file".to_string(),
        ));
    }

    // Upload both files concurrently; either failure aborts the pipeline
    // before any draft exists
    let asset_id = generate_asset_id();
    let resume_key = format!("resumes/{}.{}", asset_id, resume_ext);
    let photo_key = format!("photos/{}.{}", asset_id, photo_ext);

    let (resume_result, photo_result) = tokio::join!(
        state
            .storage_service
            .upload(resume.data.clone(), &resume_key, content_type_for(&resume_ext)),
        state
            .storage_service
            .upload(photo.data, &photo_key, content_type_for(&photo_ext)),
    );

    let resume_url = resume_result.map_err(|e| {
        warn!(error = %e, user_id = %authed.id, "Resume upload failed");
        ApiError::UploadFailed("Resume upload failed".to_string())
    })?;
    let photo_url = photo_result.map_err(|e| {
        warn!(error = %e, user_id = %authed.id, "Photo upload failed");
        ApiError::UploadFailed("Photo upload failed".to_string())
    })?;

    // PDFs are parsed locally; other formats go to the extractor by URL
    let source = if resume_ext == "pdf" {
        match pdf_extract::extract_text_from_mem(&resume.data) {
            Ok(text) if !text.trim().is_empty() => ExtractionSource::Text(text),
            _ => ExtractionSource::Url(resume_url.clone()),
        }
    } else {
        ExtractionSource::Url(resume_url.clone())
    };

    let schema = extraction_schema();
    let outcome = state
        .extraction_service
        .extract_structured(source, &schema)
        .await
        .map_err(|e| match e {
            ExtractionError::NotConfigured => {
                ApiError::ServiceUnavailable("Extraction service not configured".to_string())
            }
            other => ApiError::ExtractionFailed(other.to_string()),
        })?;

    if !outcome.is_success() {
        warn!(
            user_id = %authed.id,
            status = %outcome.status,
            "Extraction returned non-success status"
        );
        return Err(ApiError::ExtractionFailed(
            outcome
                .details
                .unwrap_or_else(|| "Resume extraction did not succeed".to_string()),
        ));
    }

    let output = outcome.output.unwrap_or_else(|| serde_json::json!({}));
    let draft = PortfolioDraft::from_extraction(&output, photo_url, resume_url);

    info!(user_id = %authed.id, "Ingestion produced editable draft");

    Ok(Json(draft))
}

/// POST /api/portfolios - Create the portfolio from the edited draft
///
/// Issues exactly one insert. On failure the caller's draft is untouched and
/// the same request can simply be retried.
pub async fn create_portfolio(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(draft): Json<PortfolioDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await;

    let template = draft
        .template
        .as_deref()
        .filter(|t| !t.is_empty())
        .and_then(TemplateKey::parse)
        .unwrap_or(DEFAULT_TEMPLATE);

    let portfolio_id = generate_portfolio_id();

    // serde_json::to_string on in-memory values cannot fail here
    let skills = serde_json::to_string(&draft.skills).unwrap_or_else(|_| "[]".to_string());
    let achievements =
        serde_json::to_string(&draft.achievements).unwrap_or_else(|_| "[]".to_string());
    let hobbies = serde_json::to_string(&draft.hobbies).unwrap_or_else(|_| "[]".to_string());
    let experience = serde_json::to_string(&draft.experience).unwrap_or_else(|_| "[]".to_string());
    let education = serde_json::to_string(&draft.education).unwrap_or_else(|_| "[]".to_string());
    let day_plan = draft
        .day_plan
        .as_ref()
        .and_then(|p| serde_json::to_string(p).ok());
    let case_study = draft
        .case_study
        .as_ref()
        .and_then(|c| serde_json::to_string(c).ok());

    sqlx::query(
        r#"
        INSERT INTO salespeople (
            id, full_name, title, email, phone, photo_url, resume_url, summary,
            skills, achievements, hobbies, experience, education, day_plan,
            case_study, template, created_by, created_date, updated_date
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'), datetime('now'))
        "#,
    )
    .bind(&portfolio_id)
    .bind(&draft.full_name)
    .bind(&draft.title)
    .bind(&draft.email)
    .bind(&draft.phone)
    .bind(&draft.photo_url)
    .bind(&draft.resume_url)
    .bind(&draft.summary)
    .bind(&skills)
    .bind(&achievements)
    .bind(&hobbies)
    .bind(&experience)
    .bind(&education)
    .bind(&day_plan)
    .bind(&case_study)
    .bind(template.as_str())
    .bind(&authed.email)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let row = sqlx::query_as::<_, PortfolioRow>("SELECT * FROM salespeople WHERE id = ?")
        .bind(&portfolio_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(user_id = %authed.id, portfolio_id = %portfolio_id, "Portfolio created");

    Ok((StatusCode::CREATED, Json(row.into_portfolio())))
}
