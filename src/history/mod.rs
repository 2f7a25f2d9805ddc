//! Conversation history
//!
//! Turns are stored per session as an ordered, append-only list. A request
//! reads at most the last `2 * max_history_turns` entries and, once the model
//! has finished answering, appends the user/model pair in a single write.

pub mod memory;
pub mod store;

pub use memory::InMemoryStore;
pub use store::PersistentStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One message in a conversation; also the unit a prompt is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }
}

/// Keep the last `limit` exchanges (two turns each) of `turns`
pub(crate) fn tail(turns: &[ConversationTurn], limit: usize) -> Vec<ConversationTurn> {
    let keep = limit.saturating_mul(2);
    let start = turns.len().saturating_sub(keep);
    turns[start..].to_vec()
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// The last `limit` exchanges of a session, oldest first
    async fn recent(&self, session_id: &str, limit: usize) -> Result<Vec<ConversationTurn>>;

    /// Every turn of a session, oldest first
    async fn all(&self, session_id: &str) -> Result<Vec<ConversationTurn>>;

    /// Append a user message and the model's answer as one unit
    async fn append_exchange(&self, session_id: &str, user: &str, model: &str) -> Result<()>;

    /// Drop a session's history. Returns `false` when there was nothing to drop.
    async fn clear(&self, session_id: &str) -> Result<bool>;

    async fn is_healthy(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str;
}
