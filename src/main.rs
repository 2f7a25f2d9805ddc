use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use tourchat::api::AppState;
use tourchat::history::{HistoryStore, InMemoryStore, PersistentStore};
use tourchat::users::UserDirectory;
use tourchat::{
    CatalogLoader, ChatService, CompletionService, GeminiClient, KeywordTranslator,
    TourChatConfig, logging, web,
};

fn open_storage(
    config: &TourChatConfig,
) -> Result<(Arc<dyn HistoryStore>, Arc<dyn UserDirectory>)> {
    match config.storage.backend.as_str() {
        "memory" => {
            warn!("Using in-memory storage; history is lost on restart");
            let store = Arc::new(InMemoryStore::new());
            let history: Arc<dyn HistoryStore> = store.clone();
            let users: Arc<dyn UserDirectory> = store;
            Ok((history, users))
        }
        "fjall" => {
            let store = Arc::new(
                PersistentStore::open(&config.storage.path)
                    .with_context(|| format!("Failed to open store at {}", config.storage.path))?,
            );
            let history: Arc<dyn HistoryStore> = store.clone();
            let users: Arc<dyn UserDirectory> = store;
            Ok((history, users))
        }
        other => bail!("Unknown storage backend '{other}'"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = TourChatConfig::load_from_path(config_path)?;
    logging::init(&config.logging);
    info!("🚀 Starting TourChat API v{}", tourchat::VERSION);

    if let Some((language, missing)) = tourchat::incomplete_language_profiles().first() {
        bail!("Language profile '{language}' is missing {missing:?}");
    }

    let catalog = Arc::new(CatalogLoader::load(&config.catalog.path));
    if catalog.is_empty() {
        warn!("⚠️ No tours loaded from {}", config.catalog.path);
    }

    let (history, users) = open_storage(&config)?;

    let completion: Arc<dyn CompletionService> =
        Arc::new(GeminiClient::new(&config.gemini, &config.gemini.model)?);
    let translation: Arc<dyn CompletionService> = Arc::new(GeminiClient::new(
        &config.gemini,
        &config.gemini.translation_model,
    )?);
    let translator = KeywordTranslator::new(
        translation,
        Duration::from_secs(config.gemini.translation_timeout_seconds),
    );

    let chat = Arc::new(ChatService::new(
        catalog.clone(),
        completion.clone(),
        translator,
        history.clone(),
        config.storage.max_history_turns,
    ));

    let state = AppState {
        chat,
        catalog,
        history,
        users,
        completion,
        default_language: config.default_language()?,
    };

    let app = web::app(state, &config.server.static_index);
    info!("✅ Initialization complete");
    web::run(&config.bind_address(), app).await
}
