//! `pantry-ai`
//!
//! **Responsibility:** chat assistant boundary.
//!
//! This crate is intentionally **not** part of the inventory model:
//! - It must not depend on ledger types.
//! - It must not mutate inventory state.
//! - Completion failures are recovered here and never reach the ledger.

pub mod completion;
pub mod message;
pub mod relay;
pub mod result;

pub use completion::{CompletionClient, OpenAiCompletionClient};
pub use message::{ChatMessage, Role};
pub use relay::{ChatOutcome, ChatRelay, RelaySettings};
pub use result::CompletionError;
