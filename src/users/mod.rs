//! Registered chat users
//!
//! A session can only chat once its owner has registered. Registration is
//! keyed by e-mail: registering again with a known address updates the
//! profile and moves it to the new session.

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{Result, TourChatError};

const MIN_NAME_CHARS: usize = 2;
const MIN_WHATSAPP_DIGITS: usize = 6;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// Registration payload as posted by the web client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationRequest {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub correo: String,
    #[serde(default)]
    pub whatsapp: String,
    pub session_id: Option<String>,
}

/// A registration that passed validation, with normalized fields
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub session_id: String,
}

impl RegistrationRequest {
    pub fn validate(&self) -> Result<ValidRegistration> {
        let name = self.nombre.trim();
        if name.chars().count() < MIN_NAME_CHARS {
            return Err(TourChatError::validation(
                "El nombre debe tener al menos 2 caracteres",
            ));
        }

        let email = self.correo.trim().to_lowercase();
        if !EMAIL_PATTERN.is_match(&email) {
            return Err(TourChatError::validation(format!(
                "Correo electrónico inválido: {email}"
            )));
        }

        let whatsapp = self.whatsapp.trim();
        if whatsapp.len() < MIN_WHATSAPP_DIGITS || !whatsapp.chars().all(|c| c.is_ascii_digit()) {
            return Err(TourChatError::validation(
                "Número de WhatsApp inválido (debe contener solo números y tener al menos 6 dígitos)",
            ));
        }

        let session_id = self
            .session_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map_or_else(default_session_id, str::to_string);

        Ok(ValidRegistration {
            name: name.to_string(),
            email,
            whatsapp: whatsapp.to_string(),
            session_id,
        })
    }
}

/// `session_{unix_seconds}`
#[must_use]
pub fn default_session_id() -> String {
    format!("session_{}", Utc::now().timestamp())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Created,
    Updated,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>>;

    async fn find_by_session(&self, session_id: &str) -> Result<Option<UserProfile>>;

    /// Insert or replace the profile stored under its e-mail address
    async fn upsert(&self, user: UserProfile) -> Result<()>;
}

/// Validate and store a registration
pub async fn register(
    directory: &dyn UserDirectory,
    request: &RegistrationRequest,
) -> Result<(UserProfile, RegistrationOutcome)> {
    let valid = request.validate()?;
    let now = Utc::now();

    let (user, outcome) = match directory.find_by_email(&valid.email).await? {
        Some(existing) => {
            info!("Updating existing user: {}", valid.email);
            let user = UserProfile {
                name: valid.name,
                whatsapp: valid.whatsapp,
                session_id: valid.session_id,
                last_seen: now,
                ..existing
            };
            (user, RegistrationOutcome::Updated)
        }
        None => {
            info!("Creating new user: {}", valid.email);
            let user = UserProfile {
                id: Uuid::new_v4(),
                name: valid.name,
                email: valid.email,
                whatsapp: valid.whatsapp,
                session_id: valid.session_id,
                created_at: now,
                last_seen: now,
            };
            (user, RegistrationOutcome::Created)
        }
    };

    directory.upsert(user.clone()).await?;
    Ok((user, outcome))
}
