use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
};

use pantry_infra::blob_store::BlobStore;

use crate::app::errors;
use crate::app::services::AppServices;

/// Serve an uploaded image so the URLs stored on entries resolve.
pub async fn get_blob(
    Extension(services): Extension<Arc<AppServices>>,
    Path(path): Path<String>,
) -> axum::response::Response {
    match services.blobs.get(&path).await {
        Ok(Some(blob)) => {
            let content_type = blob
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string());
            (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], blob.bytes).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "blob not found"),
        Err(e) => errors::json_error(StatusCode::BAD_REQUEST, "invalid_blob_path", e.to_string()),
    }
}
