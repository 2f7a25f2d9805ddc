#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;

use tourchat::llm::TextStream;
use tourchat::{
    Catalog, CatalogLoader, ChatService, CompletionService, ConversationTurn, HistoryStore,
    KeywordTranslator, Result, TourChatError,
};

pub const CATALOG_JSON: &str = r#"[
    {
        "titulo_producto": "Uros Floating Islands",
        "tipo_servicio": "Half day",
        "descripcion_tab": "Visit the reed islands of Lake Titicaca",
        "itinerario_ta": "Pick up at your hotel in Puno and boat ride to the Uros.",
        "url_servicio": "https://tours.example.com/uros",
        "prioridad": 1,
        "precios_rango": "{\"desde\":[1,5],\"hasta\":[4,10],\"precio\":[50,40]}"
    },
    {
        "titulo_producto": "Uros and Taquile Full Day",
        "tipo_servicio": "Full day",
        "descripcion_tab": "Uros islands and Taquile island",
        "url_servicio": "https://tours.example.com/uros-taquile",
        "prioridad": 2
    },
    {
        "titulo_producto": "Amantani Homestay",
        "tipo_servicio": "2 days 1 night",
        "descripcion_tab": "Stay with a local family on Lake Titicaca",
        "url_servicio": "https://tours.example.com/amantani",
        "prioridad": 1
    },
    {
        "titulo_producto": "Sillustani Tombs",
        "tipo_servicio": "Half day",
        "descripcion_tab": "Pre-Inca towers near Puno",
        "url_servicio": "https://tours.example.com/sillustani",
        "prioridad": 3
    },
    {
        "titulo_producto": "Colca Canyon",
        "tipo_servicio": "Full day",
        "descripcion_tab": "Condors over the canyon",
        "url_servicio": "https://tours.example.com/colca",
        "prioridad": 2
    },
    {
        "titulo_producto": "Machu Picchu by Train",
        "tipo_servicio": "Full day",
        "descripcion_tab": "The Inca citadel",
        "url_servicio": "https://tours.example.com/machu-picchu",
        "prioridad": 1
    }
]"#;

pub fn catalog() -> Arc<Catalog> {
    let tours = CatalogLoader::parse_json(CATALOG_JSON).expect("fixture catalog parses");
    Arc::new(Catalog::new(tours))
}

/// How the fake model answers a streaming request
#[derive(Clone)]
pub enum Script {
    Chunks(Vec<&'static str>),
    /// Yields the chunks, then an error item
    BreaksAfter(Vec<&'static str>),
    /// The request itself fails
    Refused,
}

pub struct FakeCompletion {
    pub translation: &'static str,
    pub script: Script,
    pub healthy: bool,
    pub complete_calls: AtomicUsize,
    pub last_prompt: std::sync::Mutex<Vec<ConversationTurn>>,
}

impl FakeCompletion {
    pub fn new(script: Script) -> Self {
        Self {
            translation: "islands, price",
            script,
            healthy: true,
            complete_calls: AtomicUsize::new(0),
            last_prompt: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn complete(&self, _messages: &[ConversationTurn]) -> Result<String> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.translation.to_string())
    }

    async fn stream(&self, messages: Vec<ConversationTurn>) -> Result<TextStream> {
        *self.last_prompt.lock().unwrap() = messages;
        match &self.script {
            Script::Chunks(chunks) => {
                let items: Vec<Result<String>> =
                    chunks.iter().map(|c| Ok(c.to_string())).collect();
                Ok(stream::iter(items).boxed())
            }
            Script::BreaksAfter(chunks) => {
                let mut items: Vec<Result<String>> =
                    chunks.iter().map(|c| Ok(c.to_string())).collect();
                items.push(Err(TourChatError::api("connection reset")));
                Ok(stream::iter(items).boxed())
            }
            Script::Refused => Err(TourChatError::api("model overloaded")),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }
}

pub fn chat_service(
    catalog: Arc<Catalog>,
    completion: Arc<FakeCompletion>,
    history: Arc<dyn HistoryStore>,
) -> ChatService {
    let completion: Arc<dyn CompletionService> = completion;
    let translator = KeywordTranslator::new(completion.clone(), Duration::from_secs(1));
    ChatService::new(catalog, completion, translator, history, 5)
}
