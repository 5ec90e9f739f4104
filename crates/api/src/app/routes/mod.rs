use axum::{routing::get, Router};

pub mod blobs;
pub mod chat;
pub mod inventory;
pub mod system;

/// Router for all application endpoints (everything except `/health`).
pub fn router() -> Router {
    Router::new()
        .nest("/inventory", inventory::router())
        .route("/chat", get(chat::get_chat).post(chat::send_message))
        .route("/blobs/*path", get(blobs::get_blob))
}
