use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt, future};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::sse::SseDecoder;
use super::{CompletionService, TextStream};
use crate::config::GeminiConfig;
use crate::history::ConversationTurn;
use crate::{Result, TourChatError};

/// Gemini `generateContent` REST client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout_seconds: u64,
    generation: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: &'a GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(TourChatError::api(format!("prompt blocked: {reason}")));
        }

        Ok(self
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default())
    }
}

fn to_contents(messages: &[ConversationTurn]) -> Vec<Content<'_>> {
    messages
        .iter()
        .map(|turn| Content {
            role: turn.role.as_str(),
            parts: [Part {
                text: &turn.content,
            }],
        })
        .collect()
}

fn parse_event(data: &str) -> Result<String> {
    serde_json::from_str::<GenerateContentResponse>(data)
        .map_err(|e| TourChatError::api(format!("unreadable stream chunk: {e}")))?
        .text()
}

impl GeminiClient {
    /// Build a client for `model`. Fails when no API key is configured.
    pub fn new(config: &GeminiConfig, model: &str) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                TourChatError::config("Gemini API key is required (gemini.api_key or GEMINI_API_KEY)")
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("tourchat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TourChatError::config(format!("failed to build HTTP client: {e}")))?;

        info!("Gemini client ready for model {}", model);
        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout_seconds: config.timeout_seconds,
            generation: GenerationConfig {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                max_output_tokens: config.max_output_tokens,
            },
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn model_url(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, self.model, method)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> TourChatError {
        if e.is_timeout() {
            TourChatError::timeout(format!("Gemini request to {}", self.model), self.timeout_seconds)
        } else {
            TourChatError::api(format!("Gemini request failed: {e}"))
        }
    }

    async fn post(&self, url: &str, messages: &[ConversationTurn]) -> Result<Response> {
        let request = GenerateContentRequest {
            contents: to_contents(messages),
            generation_config: &self.generation,
        };

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TourChatError::api(format!(
                "Gemini API error {status}: {error_text}"
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    #[tracing::instrument(name = "gemini_complete", level = "debug", skip_all, fields(model = %self.model))]
    async fn complete(&self, messages: &[ConversationTurn]) -> Result<String> {
        let response = self.post(&self.model_url("generateContent"), messages).await?;
        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| TourChatError::api(format!("Failed to parse Gemini response: {e}")))?;
        body.text()
    }

    #[tracing::instrument(name = "gemini_stream", level = "debug", skip_all, fields(model = %self.model))]
    async fn stream(&self, messages: Vec<ConversationTurn>) -> Result<TextStream> {
        let url = format!("{}?alt=sse", self.model_url("streamGenerateContent"));
        let response = self.post(&url, &messages).await?;
        debug!("Gemini stream opened");

        let bytes = response.bytes_stream().boxed();
        let state = (bytes, SseDecoder::new(), VecDeque::new(), false);

        let stream = futures::stream::unfold(
            state,
            |(mut bytes, mut decoder, mut pending, mut done)| async move {
                loop {
                    if let Some(item) = pending.pop_front() {
                        return Some((item, (bytes, decoder, pending, done)));
                    }
                    if done {
                        return None;
                    }
                    match bytes.next().await {
                        Some(Ok(chunk)) => {
                            pending.extend(decoder.push(&chunk).iter().map(|e| parse_event(e)));
                        }
                        Some(Err(e)) => {
                            pending.push_back(Err(TourChatError::api(format!(
                                "Gemini stream interrupted: {e}"
                            ))));
                            done = true;
                        }
                        None => {
                            pending.extend(decoder.finish().as_deref().map(parse_event));
                            done = true;
                        }
                    }
                }
            },
        );

        Ok(stream
            .try_filter(|text| future::ready(!text.is_empty()))
            .boxed())
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/models/{}", self.base_url, self.model);
        match self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!("Gemini health check returned {}", response.status());
                false
            }
            Err(e) => {
                warn!("Gemini health check failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.map(str::to_string),
            ..GeminiConfig::default()
        }
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = GeminiClient::new(&config(None), "gemini-2.0-flash-exp").unwrap_err();
        assert!(matches!(err, TourChatError::Config { .. }));
        assert!(GeminiClient::new(&config(Some("  ")), "m").is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let client = GeminiClient::new(&config(Some("key")), "gemini-2.0-flash-exp").unwrap();
        let messages = vec![
            ConversationTurn::user("system"),
            ConversationTurn::model("greeting"),
        ];
        let request = GenerateContentRequest {
            contents: to_contents(&messages),
            generation_config: &client.generation,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "system");
        assert_eq!(json["generationConfig"]["topK"], 64);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(
            client.model_url("generateContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent"
        );
    }

    #[test]
    fn test_parse_event_joins_parts() {
        let data = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"¡Hola"},{"text":"!"}]}}]}"#;
        assert_eq!(parse_event(data).unwrap(), "¡Hola!");
        assert_eq!(parse_event(r#"{"candidates":[]}"#).unwrap(), "");
    }

    #[test]
    fn test_parse_event_surfaces_blocked_prompt() {
        let data = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let err = parse_event(data).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
        assert!(parse_event("not json").is_err());
    }
}
