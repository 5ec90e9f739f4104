use base64::Engine;
use serde::{Deserialize, Serialize};

use pantry_ai::{ChatMessage, ChatOutcome};
use pantry_infra::ImageUpload;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub name: String,
    /// Defaults to one unit, like the add form.
    #[serde(default = "default_quantity")]
    pub quantity: u64,
    pub image: Option<ImageRequest>,
}

fn default_quantity() -> u64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub file_name: String,
    pub content_type: Option<String>,
    /// Standard base64 (padding optional).
    pub data_base64: String,
}

impl ImageRequest {
    pub fn into_upload(self) -> Result<ImageUpload, axum::response::Response> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(self.data_base64.trim())
            .or_else(|_| base64::engine::general_purpose::STANDARD_NO_PAD.decode(self.data_base64.trim()))
            .map_err(|e| {
                errors::json_error(
                    axum::http::StatusCode::BAD_REQUEST,
                    "invalid_image",
                    format!("image data is not valid base64: {e}"),
                )
            })?;

        Ok(ImageUpload {
            file_name: self.file_name,
            content_type: self.content_type,
            bytes,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ChatView<'a> {
    pub transcript: &'a [ChatMessage],
    pub pending_input: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse<'a> {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub chat: ChatView<'a>,
}

impl<'a> SendMessageResponse<'a> {
    pub fn new(outcome: ChatOutcome, chat: ChatView<'a>) -> Self {
        let (outcome, reply, error) = match outcome {
            ChatOutcome::Ignored => ("ignored", None, None),
            ChatOutcome::Answered(reply) => ("answered", Some(reply), None),
            ChatOutcome::Failed(e) => ("failed", None, Some(e)),
        };
        Self {
            outcome,
            reply,
            error,
            chat,
        }
    }
}
