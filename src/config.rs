//! Configuration management for the `TourChat` service
//!
//! Handles loading configuration from an optional TOML file and environment
//! variables, and provides validation for all configuration settings.

use crate::TourChatError;
use crate::language::Language;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `TourChat` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TourChatConfig {
    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,
    /// Gemini API settings shared by chat and translation
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Tour catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// History and user storage
    #[serde(default)]
    pub storage: StorageConfig,
    /// Conversation language defaults
    #[serde(default)]
    pub language: LanguageConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Page served at `/app`
    pub static_index: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Falls back to the `GEMINI_API_KEY` environment variable
    pub api_key: Option<String>,
    /// Model answering chat requests
    pub model: String,
    /// Model used for keyword translation
    pub translation_model: String,
    pub base_url: String,
    /// Upper bound for a whole request, streamed body included
    pub timeout_seconds: u64,
    /// Budget for the keyword translation call
    pub translation_timeout_seconds: u64,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON export of the tour catalog
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `fjall` (persistent) or `memory`
    pub backend: String,
    /// Database directory for the `fjall` backend
    pub path: String,
    /// Exchanges of history sent with each request
    pub max_history_turns: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Used when a request names no language or an unknown one
    pub default: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_static_index() -> String {
    "static/index.html".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_translation_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_timeout() -> u64 {
    60
}

fn default_translation_timeout() -> u64 {
    10
}

fn default_catalog_path() -> String {
    "tours_ingles.json".to_string()
}

fn default_storage_backend() -> String {
    "fjall".to_string()
}

fn default_storage_path() -> String {
    dirs::data_local_dir()
        .map(|dir| dir.join("tourchat").join("db"))
        .unwrap_or_else(|| PathBuf::from("data/tourchat"))
        .to_string_lossy()
        .into_owned()
}

fn default_max_history_turns() -> usize {
    5
}

fn default_language() -> String {
    "es".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_index: default_static_index(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            translation_model: default_translation_model(),
            base_url: default_gemini_base_url(),
            timeout_seconds: default_gemini_timeout(),
            translation_timeout_seconds: default_translation_timeout(),
            temperature: 0.6,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 8192,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: default_storage_path(),
            max_history_turns: default_max_history_turns(),
        }
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            default: default_language(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl TourChatConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TOURCHAT_GEMINI__API_KEY, TOURCHAT_SERVER__PORT, ...
        builder = builder.add_source(
            Environment::with_prefix("TOURCHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TourChatConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_env_fallbacks(
            std::env::var("GEMINI_API_KEY").ok(),
            std::env::var("PORT").ok(),
        );
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tourchat").join("config.toml"))
    }

    /// Conventional platform variables, used only where nothing more specific is set
    pub fn apply_env_fallbacks(&mut self, gemini_api_key: Option<String>, port: Option<String>) {
        if self.gemini.api_key.is_none() {
            self.gemini.api_key = gemini_api_key;
        }
        if self.server.port == default_port() {
            if let Some(port) = port.and_then(|p| p.trim().parse::<u16>().ok()) {
                self.server.port = port;
            }
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.static_index.is_empty() {
            self.server.static_index = default_static_index();
        }
        if self.gemini.model.is_empty() {
            self.gemini.model = default_gemini_model();
        }
        if self.gemini.translation_model.is_empty() {
            self.gemini.translation_model = default_translation_model();
        }
        if self.gemini.base_url.is_empty() {
            self.gemini.base_url = default_gemini_base_url();
        }
        if self.gemini.timeout_seconds == 0 {
            self.gemini.timeout_seconds = default_gemini_timeout();
        }
        if self.gemini.translation_timeout_seconds == 0 {
            self.gemini.translation_timeout_seconds = default_translation_timeout();
        }
        if self.catalog.path.is_empty() {
            self.catalog.path = default_catalog_path();
        }
        if self.storage.backend.is_empty() {
            self.storage.backend = default_storage_backend();
        }
        if self.storage.path.is_empty() {
            self.storage.path = default_storage_path();
        }
        if self.storage.max_history_turns == 0 {
            self.storage.max_history_turns = default_max_history_turns();
        }
        if self.language.default.is_empty() {
            self.language.default = default_language();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.gemini.api_key {
            if api_key.trim().is_empty() {
                return Err(TourChatError::config(
                    "Gemini API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }
        }
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.gemini.timeout_seconds > 300 {
            return Err(TourChatError::config("Gemini timeout cannot exceed 300 seconds").into());
        }

        if self.gemini.translation_timeout_seconds > self.gemini.timeout_seconds {
            return Err(TourChatError::config(
                "Translation timeout cannot exceed the Gemini request timeout",
            )
            .into());
        }

        if !(0.0..=2.0).contains(&self.gemini.temperature) {
            return Err(TourChatError::config("Temperature must be between 0.0 and 2.0").into());
        }

        if !(0.0..=1.0).contains(&self.gemini.top_p) {
            return Err(TourChatError::config("top_p must be between 0.0 and 1.0").into());
        }

        if self.gemini.top_k == 0 || self.gemini.max_output_tokens == 0 {
            return Err(
                TourChatError::config("top_k and max_output_tokens must be positive").into(),
            );
        }

        if self.storage.max_history_turns > 50 {
            return Err(TourChatError::config("History window cannot exceed 50 turns").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TourChatError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TourChatError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let valid_backends = ["fjall", "memory"];
        if !valid_backends.contains(&self.storage.backend.as_str()) {
            return Err(TourChatError::config(format!(
                "Invalid storage backend '{}'. Must be one of: {}",
                self.storage.backend,
                valid_backends.join(", ")
            ))
            .into());
        }

        if !self.gemini.base_url.starts_with("http://")
            && !self.gemini.base_url.starts_with("https://")
        {
            return Err(TourChatError::config(
                "Gemini base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        self.default_language()?;
        Ok(())
    }

    /// The configured fallback conversation language
    pub fn default_language(&self) -> Result<Language> {
        Language::from_tag(&self.language.default)
            .with_context(|| "Invalid language.default".to_string())
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
