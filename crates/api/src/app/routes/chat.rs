use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::IntoResponse,
    Json,
};

use crate::app::dto::{self, ChatView, SendMessageResponse};
use crate::app::errors;
use crate::app::services::AppServices;

pub async fn get_chat(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let relay = services.chat.lock().await;
    Json(ChatView {
        transcript: relay.transcript(),
        pending_input: relay.pending_input(),
    })
    .into_response()
}

/// Completion failures are reported in the body (`outcome: "failed"`), never as an
/// error status. Only a malformed request body is rejected.
pub async fn send_message(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::SendMessageRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let mut relay = services.chat.lock().await;
    let outcome = relay.send_message(&body.text).await;

    Json(SendMessageResponse::new(
        outcome,
        ChatView {
            transcript: relay.transcript(),
            pending_input: relay.pending_input(),
        },
    ))
    .into_response()
}
