use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::services::{self, AppServices};
use crate::app::{dto, errors};

/// Base64 images inflate by a third; leave room for a phone photo.
const ADD_ITEM_BODY_LIMIT: usize = 16 * 1024 * 1024;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items))
        .route("/reload", post(reload))
        .route(
            "/items",
            post(add_item).layer(DefaultBodyLimit::max(ADD_ITEM_BODY_LIMIT)),
        )
        .route("/items/:name/remove", post(remove_item))
        .route("/search", get(search))
        .route("/shelf", get(shelf))
        .route("/stream", get(stream))
}

pub async fn list_items(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    Json(services.ledger.snapshot().as_slice()).into_response()
}

pub async fn reload(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.ledger.reload().await {
        Ok(items) => Json(items.as_slice()).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn add_item(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::AddItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let image = match body.image.map(dto::ImageRequest::into_upload).transpose() {
        Ok(image) => image,
        Err(resp) => return resp,
    };

    if let Err(e) = services.ledger.add_item(&body.name, body.quantity, image).await {
        return errors::ledger_error_to_response(e);
    }

    (StatusCode::OK, Json(services.ledger.snapshot().as_slice())).into_response()
}

pub async fn remove_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    if let Err(e) = services.ledger.remove_item(&name).await {
        return errors::ledger_error_to_response(e);
    }

    (StatusCode::OK, Json(services.ledger.snapshot().as_slice())).into_response()
}

pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::SearchQuery>,
) -> axum::response::Response {
    Json(services.ledger.search(&query.q)).into_response()
}

pub async fn shelf(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    Json(services.ledger.shelf()).into_response()
}

pub async fn stream(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Sse<impl tokio_stream::Stream<Item = Result<axum::response::sse::Event, std::convert::Infallible>>> {
    services::inventory_sse_stream(services)
}
