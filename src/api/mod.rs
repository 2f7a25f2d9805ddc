//! JSON and streaming HTTP handlers

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::catalog::{Catalog, DestinationSummary};
use crate::chat::ChatService;
use crate::history::{ConversationTurn, HistoryStore};
use crate::language::Language;
use crate::llm::CompletionService;
use crate::users::{RegistrationOutcome, RegistrationRequest, UserDirectory, register};
use crate::{TourChatError, VERSION};

const DEFAULT_SESSION: &str = "default_session";

/// Application state shared with all routes
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub catalog: Arc<Catalog>,
    pub history: Arc<dyn HistoryStore>,
    pub users: Arc<dyn UserDirectory>,
    pub completion: Arc<dyn CompletionService>,
    pub default_language: Language,
}

/// Error type for HTTP handlers; rendered as `{"error": "..."}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Internal(TourChatError),
}

impl From<TourChatError> for ApiError {
    fn from(e: TourChatError) -> Self {
        match e {
            TourChatError::Validation { .. } | TourChatError::UnsupportedLanguage { .. } => {
                Self::BadRequest(e.user_message())
            }
            other => Self::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::Internal(e) => {
                error!(error = %e, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error interno del servidor".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn no_body(rejection: JsonRejection) -> ApiError {
    warn!("Rejected request body: {}", rejection);
    ApiError::BadRequest("No se proporcionaron datos".to_string())
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    pub session_id: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub success: bool,
    pub message: &'static str,
    pub usuario_id: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub session_id: String,
    pub usuario_id: String,
    pub historial: Vec<ConversationTurn>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DestinationsResponse {
    pub success: bool,
    pub destinations: Vec<DestinationSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub database: bool,
    pub tours_loaded: bool,
    pub gemini_api: bool,
    pub version: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/register_user", post(register_user))
        .route("/chat", post(chat))
        .route("/session/{session_id}/history", get(session_history))
        .route("/session/{session_id}/clear", post(clear_session))
        .route("/destinations", get(destinations))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "TourChat API is running",
        "version": VERSION,
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "endpoints": [
            "/health",
            "/register_user",
            "/chat",
            "/destinations",
            "/session/{session_id}/history",
            "/session/{session_id}/clear",
            "/app"
        ]
    }))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.history.is_healthy().await;
    let tours_loaded = !state.catalog.is_empty();
    let gemini_api = state.completion.health_check().await;
    let healthy = database && tours_loaded && gemini_api;

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "degraded" },
            timestamp: Utc::now().to_rfc3339(),
            database,
            tours_loaded,
            gemini_api,
            version: VERSION,
        }),
    )
}

async fn register_user(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    let Json(request) = payload.map_err(no_body)?;

    let (user, outcome) = register(state.users.as_ref(), &request).await.map_err(|e| {
        if matches!(e, TourChatError::Validation { .. }) {
            warn!("Registration rejected: {}", e);
        }
        ApiError::from(e)
    })?;

    Ok(Json(RegistrationResponse {
        success: true,
        message: match outcome {
            RegistrationOutcome::Created => "Usuario registrado exitosamente",
            RegistrationOutcome::Updated => "Datos de usuario actualizados",
        },
        usuario_id: user.id.to_string(),
        session_id: user.session_id,
    }))
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(no_body)?;

    let message = request.message.trim();
    let session_id = request.session_id.as_deref().unwrap_or(DEFAULT_SESSION);
    let language = Language::resolve_or(request.language.as_deref(), state.default_language);
    info!("New chat request - session: {}, language: {}", session_id, language);

    if message.is_empty() {
        return Err(ApiError::BadRequest(
            "El mensaje no puede estar vacío".to_string(),
        ));
    }

    if state.users.find_by_session(session_id).await?.is_none() {
        warn!("Unregistered session: {}", session_id);
        return Err(ApiError::Unauthorized(
            "Por favor regístrate primero".to_string(),
        ));
    }

    let reply = state.chat.respond(session_id, message, language).await?;
    let body = Body::from_stream(reply.map(Ok::<_, Infallible>));

    Ok(([(header::CONTENT_TYPE, "text/event-stream")], body).into_response())
}

async fn session_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let user = state
        .users
        .find_by_session(&session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Sesión no encontrada".to_string()))?;

    let historial = state.history.all(&session_id).await?;
    Ok(Json(HistoryResponse {
        success: true,
        count: historial.len(),
        session_id,
        usuario_id: user.id.to_string(),
        historial,
    }))
}

async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.history.clear(&session_id).await? {
        return Err(ApiError::NotFound("Sesión no encontrada".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": format!("Historial de sesión {session_id} limpiado"),
    })))
}

async fn destinations(State(state): State<AppState>) -> Json<DestinationsResponse> {
    let destinations = state.catalog.destination_summaries();
    Json(DestinationsResponse {
        success: true,
        total: destinations.len(),
        destinations,
    })
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Endpoint no encontrado".to_string())
}

pub async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Método no permitido" })),
    )
}
