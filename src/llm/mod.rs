//! Text completion backends
//!
//! The chat flow and the keyword translator only see [`CompletionService`];
//! [`gemini::GeminiClient`] is the production implementation.

pub mod gemini;
pub mod sse;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::Result;
use crate::history::ConversationTurn;

/// Incremental model output; an `Err` item ends the answer early.
pub type TextStream = BoxStream<'static, Result<String>>;

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// One request, whole answer
    async fn complete(&self, messages: &[ConversationTurn]) -> Result<String>;

    /// One request, answer streamed as it is generated
    async fn stream(&self, messages: Vec<ConversationTurn>) -> Result<TextStream>;

    async fn health_check(&self) -> bool;
}
