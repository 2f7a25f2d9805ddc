use std::path::Path;

use async_trait::async_trait;
use fjall::Keyspace;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;
use tokio::task;

use super::{ConversationTurn, HistoryStore, tail};
use crate::Result;
use crate::users::{UserDirectory, UserProfile};

/// fjall-backed store. Each session's turns live under one key, so an
/// exchange is persisted with a single insert.
pub struct PersistentStore {
    history: Keyspace,
    users: Keyspace,
    sessions: Keyspace,
    write_lock: Mutex<()>,
}

fn read_bytes(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

fn decode<T: DeserializeOwned>(bytes: Option<Vec<u8>>) -> Result<Option<T>> {
    bytes
        .map(|bytes| postcard::from_bytes(&bytes).map_err(Into::into))
        .transpose()
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(postcard::to_stdvec(value)?)
}

impl PersistentStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let history = db.keyspace("history", fjall::KeyspaceCreateOptions::default)?;
        let users = db.keyspace("users", fjall::KeyspaceCreateOptions::default)?;
        let sessions = db.keyspace("sessions", fjall::KeyspaceCreateOptions::default)?;
        tracing::info!("Opened history store at {}", path.as_ref().display());
        Ok(Self {
            history,
            users,
            sessions,
            write_lock: Mutex::new(()),
        })
    }

    async fn load_turns(&self, session_id: &str) -> Result<Vec<ConversationTurn>> {
        let store = self.history.clone();
        let key = session_id.as_bytes().to_vec();
        let bytes = task::spawn_blocking(move || read_bytes(store, key)).await??;
        Ok(decode(bytes)?.unwrap_or_default())
    }

    async fn load_user(&self, email: &str) -> Result<Option<UserProfile>> {
        let store = self.users.clone();
        let key = email.as_bytes().to_vec();
        let bytes = task::spawn_blocking(move || read_bytes(store, key)).await??;
        decode(bytes)
    }
}

#[async_trait]
impl HistoryStore for PersistentStore {
    #[tracing::instrument(name = "history_recent", level = "debug", skip(self))]
    async fn recent(&self, session_id: &str, limit: usize) -> Result<Vec<ConversationTurn>> {
        let turns = self.load_turns(session_id).await?;
        Ok(tail(&turns, limit))
    }

    async fn all(&self, session_id: &str) -> Result<Vec<ConversationTurn>> {
        self.load_turns(session_id).await
    }

    #[tracing::instrument(name = "history_append", level = "debug", skip(self, user, model))]
    async fn append_exchange(&self, session_id: &str, user: &str, model: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut turns = self.load_turns(session_id).await?;
        turns.push(ConversationTurn::user(user));
        turns.push(ConversationTurn::model(model));
        let bytes = encode(&turns)?;

        let store = self.history.clone();
        let key = session_id.as_bytes().to_vec();
        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        tracing::debug!("Session now holds {} turns", turns.len());
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let existing = self.load_turns(session_id).await?;
        if existing.is_empty() {
            return Ok(false);
        }

        let store = self.history.clone();
        let key = session_id.as_bytes().to_vec();
        task::spawn_blocking(move || store.remove(key)).await??;
        Ok(true)
    }

    async fn is_healthy(&self) -> bool {
        let store = self.history.clone();
        match task::spawn_blocking(move || read_bytes(store, b"__health".to_vec())).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::warn!("History store health probe failed: {}", e);
                false
            }
            Err(e) => {
                tracing::warn!("History store health probe panicked: {}", e);
                false
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "fjall"
    }
}

#[async_trait]
impl UserDirectory for PersistentStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>> {
        self.load_user(email).await
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Option<UserProfile>> {
        let store = self.sessions.clone();
        let key = session_id.as_bytes().to_vec();
        let email = task::spawn_blocking(move || read_bytes(store, key)).await??;

        match email {
            Some(email) => {
                let email = String::from_utf8_lossy(&email).into_owned();
                self.load_user(&email).await
            }
            None => Ok(None),
        }
    }

    #[tracing::instrument(name = "user_upsert", level = "debug", skip(self, user), fields(email = %user.email))]
    async fn upsert(&self, user: UserProfile) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        if let Some(previous) = self.load_user(&user.email).await? {
            if previous.session_id != user.session_id {
                let store = self.sessions.clone();
                let key = previous.session_id.into_bytes();
                task::spawn_blocking(move || store.remove(key)).await??;
            }
        }

        let bytes = encode(&user)?;
        let users = self.users.clone();
        let sessions = self.sessions.clone();
        let email = user.email.into_bytes();
        let session = user.session_id.into_bytes();
        task::spawn_blocking(move || -> Result<()> {
            users.insert(email.clone(), bytes)?;
            sessions.insert(session, email)?;
            Ok(())
        })
        .await??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::{RegistrationOutcome, RegistrationRequest, register};

    fn open_temp() -> (tempfile::TempDir, PersistentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistentStore::open(dir.path().join("db")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");
        {
            let store = PersistentStore::open(&path).unwrap();
            store.append_exchange("s1", "Uros?", "Sí, tenemos tours").await.unwrap();
        }

        let store = PersistentStore::open(&path).unwrap();
        let turns = store.all("s1").await.unwrap();
        assert_eq!(
            turns,
            vec![
                ConversationTurn::user("Uros?"),
                ConversationTurn::model("Sí, tenemos tours"),
            ]
        );
    }

    #[tokio::test]
    async fn test_recent_and_clear() {
        let (_dir, store) = open_temp();
        for i in 0..7 {
            store
                .append_exchange("s1", &format!("q{i}"), &format!("a{i}"))
                .await
                .unwrap();
        }

        let recent = store.recent("s1", 5).await.unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].content, "q2");

        assert!(store.clear("s1").await.unwrap());
        assert!(!store.clear("s1").await.unwrap());
        assert!(store.is_healthy().await);
    }

    #[tokio::test]
    async fn test_users_follow_their_latest_session() {
        let (_dir, store) = open_temp();
        let mut request = RegistrationRequest {
            nombre: "Ana".into(),
            correo: "ana@example.com".into(),
            whatsapp: "123456".into(),
            session_id: Some("first".into()),
        };
        let (_, outcome) = register(&store, &request).await.unwrap();
        assert_eq!(outcome, RegistrationOutcome::Created);

        request.session_id = Some("second".into());
        let (_, outcome) = register(&store, &request).await.unwrap();
        assert_eq!(outcome, RegistrationOutcome::Updated);

        assert!(store.find_by_session("first").await.unwrap().is_none());
        let user = store.find_by_session("second").await.unwrap().unwrap();
        assert_eq!(user.email, "ana@example.com");
    }
}
