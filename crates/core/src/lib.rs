//! `pantry-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod keyed;

pub use error::{DomainError, DomainResult};
pub use id::ItemName;
pub use keyed::Keyed;
