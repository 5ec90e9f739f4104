use std::sync::Arc;

use crate::completion::CompletionClient;
use crate::message::ChatMessage;

/// Model and preamble used for every exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub model: String,
    pub system_prompt: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
        }
    }
}

/// What happened to one `send_message` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// Blank input; nothing was recorded or sent.
    Ignored,
    /// The assistant replied with this message.
    Answered(ChatMessage),
    /// The completion call failed; the user message stays unanswered.
    Failed(String),
}

/// Chat transcript relayed to a completion service.
///
/// The transcript never contains the system preamble; it is prepended on every request.
pub struct ChatRelay {
    client: Arc<dyn CompletionClient>,
    settings: RelaySettings,
    transcript: Vec<ChatMessage>,
    pending_input: String,
}

impl ChatRelay {
    pub fn new(client: Arc<dyn CompletionClient>, settings: RelaySettings) -> Self {
        Self {
            client,
            settings,
            transcript: Vec::new(),
            pending_input: String::new(),
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Text of the last message that has not been answered yet (empty once answered).
    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    /// Append `text` as a user message and ask the completion service for a reply.
    pub async fn send_message(&mut self, text: &str) -> ChatOutcome {
        if text.trim().is_empty() {
            return ChatOutcome::Ignored;
        }

        self.pending_input = text.to_string();
        self.transcript.push(ChatMessage::user(text));

        let mut request = Vec::with_capacity(self.transcript.len() + 1);
        request.push(ChatMessage::system(self.settings.system_prompt.clone()));
        request.extend(self.transcript.iter().cloned());

        match self.client.complete(&self.settings.model, &request).await {
            Ok(reply) => {
                self.transcript.push(reply.clone());
                self.pending_input.clear();
                tracing::debug!(messages = self.transcript.len(), "chat reply appended");
                ChatOutcome::Answered(reply)
            }
            Err(e) => {
                tracing::warn!(error = %e, "error communicating with completion service");
                ChatOutcome::Failed(e.to_string())
            }
        }
    }
}

impl core::fmt::Debug for ChatRelay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChatRelay")
            .field("settings", &self.settings)
            .field("transcript", &self.transcript)
            .field("pending_input", &self.pending_input)
            .finish_non_exhaustive()
    }
}
