//! Implements the `Assistant` trait against the Gemini `generateContent` REST endpoint.

use crate::api::json::extract_json_object;
use crate::api::{prompts, Assistant, API_KEY_ENV};
use crate::model::{Amount, Category, GeneratedImage, Source, WeatherSnapshot};
use crate::{Config, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace, warn};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);
const DEFAULT_IMAGE_MIME_TYPE: &str = "image/png";
const EMPTY_COMMENT: &str = "지출 내역을 분석 중입니다...";

/// Talks to Gemini over HTTPS. Constructed without an API key it still works as an `Assistant`,
/// but every call fails.
pub(crate) struct GeminiAssistant {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    location: String,
    text_model: String,
    image_model: String,
}

impl GeminiAssistant {
    pub(crate) fn new(config: &Config, api_key: Option<String>) -> Result<Self> {
        if api_key.is_none() {
            warn!("{API_KEY_ENV} is not set, AI features will show their fallback text");
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self {
            http,
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
            api_key,
            location: config.location().to_string(),
            text_model: config.text_model().to_string(),
            image_model: config.image_model().to_string(),
        })
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("{API_KEY_ENV} is not set");
        };
        let url = format!("{}/v1beta/models/{model}:generateContent", self.base_url);
        trace!("POST {url}");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to send the request to model {model}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Model {model} returned {status}: {body}");
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse the response from model {model}"))
    }
}

#[async_trait::async_trait]
impl Assistant for GeminiAssistant {
    async fn weather(&self) -> Result<WeatherSnapshot> {
        let request = GenerateContentRequest {
            contents: vec![Content::text(prompts::weather(&self.location))],
            tools: Some(vec![Tool::google_search()]),
            generation_config: Some(GenerationConfig {
                response_modalities: None,
                thinking_config: Some(ThinkingConfig { thinking_budget: 0 }),
            }),
        };
        let response = self.generate(&self.text_model, &request).await?;
        weather_from_response(&response, &self.location)
    }

    async fn image(&self, prompt: &str) -> Result<Option<GeneratedImage>> {
        let request = GenerateContentRequest {
            contents: vec![Content::text(prompts::image(prompt))],
            tools: None,
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                thinking_config: None,
            }),
        };
        let response = self.generate(&self.image_model, &request).await?;
        let image = image_from_response(&response);
        if image.is_none() {
            debug!("The image model answered without image data");
        }
        Ok(image)
    }

    async fn spending_comment(&self, total: Amount, categories: &[Category]) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content::text(prompts::spending_comment(total, categories))],
            tools: None,
            generation_config: None,
        };
        let response = self.generate(&self.text_model, &request).await?;
        let text = response.text();
        let text = text.trim();
        if text.is_empty() {
            Ok(EMPTY_COMMENT.to_string())
        } else {
            Ok(text.to_string())
        }
    }
}

/// Builds a `WeatherSnapshot` from the model's text and grounding metadata.
fn weather_from_response(
    response: &GenerateContentResponse,
    location: &str,
) -> Result<WeatherSnapshot> {
    let text = response.text();
    let json = extract_json_object(&text)
        .with_context(|| format!("No weather JSON found in the model output: {text}"))?;
    let mut snapshot: WeatherSnapshot =
        serde_json::from_str(json).context("The weather JSON does not have the expected shape")?;

    if snapshot.location.trim().is_empty() {
        snapshot.location = location.to_string();
    }
    snapshot.news_link = snapshot
        .news_link
        .take()
        .map(|link| link.trim().to_string())
        .filter(|link| !link.is_empty())
        .and_then(|link| match Url::parse(&link) {
            Ok(_) => Some(link),
            Err(e) => {
                debug!("Dropping an unusable news link '{link}': {e}");
                None
            }
        });
    snapshot.sources = response.sources();
    Ok(snapshot)
}

/// Takes the first inline-data part of the first candidate.
fn image_from_response(response: &GenerateContentResponse) -> Option<GeneratedImage> {
    response
        .parts()
        .filter_map(|part| part.inline_data.as_ref())
        .find(|inline| !inline.data.is_empty())
        .map(|inline| {
            let mime_type = inline
                .mime_type
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_IMAGE_MIME_TYPE);
            GeneratedImage::new(mime_type, inline.data.clone())
        })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part {
                text: Some(text.into()),
                ..Part::default()
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    /// Set on parts that carry the model's reasoning rather than its answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

impl Tool {
    fn google_search() -> Self {
        Self {
            google_search: GoogleSearch {},
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl GenerateContentResponse {
    fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    fn parts(&self) -> impl Iterator<Item = &Part> + '_ {
        self.first_candidate()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|content| content.parts.iter())
    }

    /// The concatenated answer text of the first candidate, skipping thought parts.
    fn text(&self) -> String {
        self.parts()
            .filter(|part| !part.thought.unwrap_or(false))
            .filter_map(|part| part.text.as_deref())
            .collect()
    }

    /// Web sources from the first candidate's grounding metadata. Chunks without a web entry or
    /// whose URI is not a valid URL are skipped.
    fn sources(&self) -> Vec<Source> {
        let Some(metadata) = self
            .first_candidate()
            .and_then(|c| c.grounding_metadata.as_ref())
        else {
            return Vec::new();
        };
        metadata
            .grounding_chunks
            .iter()
            .filter_map(|chunk| chunk.web.as_ref())
            .filter_map(|web| {
                let uri = web.uri.as_deref()?;
                Url::parse(uri).ok()?;
                Some(Source {
                    title: web.title.clone().unwrap_or_else(|| uri.to_string()),
                    uri: uri.to_string(),
                })
            })
            .collect()
    }
}
