//! The boundary to the generative-AI service that produces weather reports, weather images and
//! spending comments.
//!
//! `Mode::Gemini` talks to the hosted Gemini REST API. `Mode::Test` uses an in-memory
//! `TestAssistant` so the whole app can be run top-to-bottom without the network.

mod gemini;
mod json;
mod prompts;
mod test_client;

use crate::model::{Amount, Category, GeneratedImage, WeatherSnapshot};
use crate::{Config, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub use test_client::{AssistantCall, TestAssistant, TestAssistantState};

pub(crate) use gemini::GeminiAssistant;

/// When this environment variable is set and non-empty, `Mode::from_env` returns `Mode::Test`.
pub const TEST_MODE_ENV: &str = "DAYDASH_IN_TEST_MODE";

/// The environment variable that holds the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// The operations the dashboard needs from the AI service. Every call may fail; callers are
/// expected to degrade to a fallback value rather than surface the error.
#[async_trait::async_trait]
pub trait Assistant: Send + Sync {
    /// Fetches a weather report for the configured location.
    async fn weather(&self) -> Result<WeatherSnapshot>;

    /// Generates an illustration for `prompt`. Returns `Ok(None)` when the service answered
    /// without image data.
    async fn image(&self, prompt: &str) -> Result<Option<GeneratedImage>>;

    /// Asks for a one-line comment about a day's spending.
    async fn spending_comment(&self, total: Amount, categories: &[Category]) -> Result<String>;
}

/// Selects which `Assistant` implementation is used.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Gemini,
    Test,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

impl Mode {
    /// Returns `Mode::Test` when `DAYDASH_IN_TEST_MODE` is set to a non-empty value, otherwise
    /// `Mode::Gemini`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Gemini,
        }
    }
}

/// Creates the `Assistant` for `mode`.
pub fn assistant(config: &Config, mode: Mode) -> Result<Arc<dyn Assistant>> {
    debug!("Creating the {mode} assistant");
    match mode {
        Mode::Gemini => {
            let api_key = std::env::var(API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty());
            Ok(Arc::new(GeminiAssistant::new(config, api_key)?))
        }
        Mode::Test => Ok(Arc::new(TestAssistant::new())),
    }
}
