// src/common/uploads.rs
//
// Serves files written by local storage. In S3 deployments these URLs are
// never handed out, so the route simply goes unused.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{ApiError, AppState};

fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or("") {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// GET /uploads/*path - Serve a locally stored upload
pub async fn serve_upload(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Reject traversal before touching the filesystem
    if path.split('/').any(|part| part == ".." || part.is_empty()) {
        return Err(ApiError::BadRequest("Invalid path".to_string()));
    }

    let state = state_lock.read().await;
    let file_path = state.uploads_dir.join(&path);

    if !file_path.exists() {
        return Err(ApiError::NotFound("File not found".to_string()));
    }

    let content = tokio::fs::read(&file_path)
        .await
        .map_err(|_| ApiError::InternalServer("Failed to read file".to_string()))?;

    Ok((
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, content_type_for(&path))],
        content,
    ))
}

pub fn uploads_routes() -> Router {
    Router::new().route("/uploads/*path", get(serve_upload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(content_type_for("resumes/a.pdf"), "application/pdf");
        assert_eq!(content_type_for("photos/a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("unknown"), "application/octet-stream");
    }
}
