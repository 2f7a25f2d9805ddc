use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ConversationTurn, HistoryStore, tail};
use crate::Result;
use crate::users::{UserDirectory, UserProfile};

/// Process-local store for history and users; contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    turns: RwLock<HashMap<String, Vec<ConversationTurn>>>,
    users: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    async fn recent(&self, session_id: &str, limit: usize) -> Result<Vec<ConversationTurn>> {
        let turns = self.turns.read().await;
        Ok(turns
            .get(session_id)
            .map(|turns| tail(turns, limit))
            .unwrap_or_default())
    }

    async fn all(&self, session_id: &str) -> Result<Vec<ConversationTurn>> {
        let turns = self.turns.read().await;
        Ok(turns.get(session_id).cloned().unwrap_or_default())
    }

    async fn append_exchange(&self, session_id: &str, user: &str, model: &str) -> Result<()> {
        let mut turns = self.turns.write().await;
        let session = turns.entry(session_id.to_string()).or_default();
        session.push(ConversationTurn::user(user));
        session.push(ConversationTurn::model(model));
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<bool> {
        let mut turns = self.turns.write().await;
        Ok(turns
            .remove(session_id)
            .is_some_and(|removed| !removed.is_empty()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Option<UserProfile>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.session_id == session_id)
            .cloned())
    }

    async fn upsert(&self, user: UserProfile) -> Result<()> {
        self.users.write().await.insert(user.email.clone(), user);
        Ok(())
    }
}
