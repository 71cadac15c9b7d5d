//! Implements the `Assistant` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without calling Gemini.

use crate::api::Assistant;
use crate::model::{Amount, Category, GeneratedImage, WeatherSnapshot};
use crate::Result;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::trace;

/// A 1x1 transparent PNG.
const SEED_IMAGE_PNG: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// A call made to a `TestAssistant`, recorded in the order it arrived.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantCall {
    Weather,
    Image(String),
    SpendingComment {
        total: Amount,
        categories: Vec<Category>,
    },
}

/// The canned answers of a `TestAssistant`. A `None` answer makes the matching call fail.
#[derive(Debug, Clone)]
pub struct TestAssistantState {
    pub weather: Option<WeatherSnapshot>,
    /// The image returned by `image`. Ignored when `image_fails` is set.
    pub image: Option<GeneratedImage>,
    pub image_fails: bool,
    pub comment: Option<String>,
    /// How long every call waits before answering.
    pub latency: Duration,
    pub calls: Vec<AssistantCall>,
}

impl Default for TestAssistantState {
    /// Seeds every answer so that all calls succeed immediately.
    fn default() -> Self {
        Self {
            weather: Some(seed_weather()),
            image: Some(GeneratedImage::new("image/png", SEED_IMAGE_PNG)),
            image_fails: false,
            comment: Some("지갑이 가벼워지는 소리가 들려요".to_string()),
            latency: Duration::ZERO,
            calls: Vec::new(),
        }
    }
}

/// An `Assistant` that answers from a shared `TestAssistantState`. Clones share the same state, so
/// a test can keep a clone to change answers or inspect recorded calls.
#[derive(Debug, Clone, Default)]
pub struct TestAssistant {
    state: Arc<Mutex<TestAssistantState>>,
}

impl TestAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: TestAssistantState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Returns a copy of the current state.
    pub async fn state(&self) -> TestAssistantState {
        self.state.lock().await.clone()
    }

    /// Changes the state with `f`.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut TestAssistantState),
    {
        f(&mut *self.state.lock().await)
    }

    pub async fn calls(&self) -> Vec<AssistantCall> {
        self.state.lock().await.calls.clone()
    }

    /// Records `call` and returns the configured latency.
    async fn record(&self, call: AssistantCall) -> Duration {
        trace!("TestAssistant received {call:?}");
        let mut state = self.state.lock().await;
        state.calls.push(call);
        state.latency
    }
}

#[async_trait::async_trait]
impl Assistant for TestAssistant {
    async fn weather(&self) -> Result<WeatherSnapshot> {
        let latency = self.record(AssistantCall::Weather).await;
        tokio::time::sleep(latency).await;
        self.state
            .lock()
            .await
            .weather
            .clone()
            .context("The test weather service is unavailable")
    }

    async fn image(&self, prompt: &str) -> Result<Option<GeneratedImage>> {
        let latency = self.record(AssistantCall::Image(prompt.to_string())).await;
        tokio::time::sleep(latency).await;
        let state = self.state.lock().await;
        anyhow::ensure!(!state.image_fails, "The test image service is unavailable");
        Ok(state.image.clone())
    }

    async fn spending_comment(&self, total: Amount, categories: &[Category]) -> Result<String> {
        let latency = self
            .record(AssistantCall::SpendingComment {
                total,
                categories: categories.to_vec(),
            })
            .await;
        tokio::time::sleep(latency).await;
        self.state
            .lock()
            .await
            .comment
            .clone()
            .context("The test comment service is unavailable")
    }
}

fn seed_weather() -> WeatherSnapshot {
    WeatherSnapshot {
        location: "Busan".to_string(),
        current_temp: 17.0,
        low_temp: 13.0,
        high_temp: 21.0,
        condition: "Light Rain".to_string(),
        comment: "비가 오니 우산을 챙기세요".to_string(),
        image_prompt: "A cute character holding an umbrella in heavy pouring rain".to_string(),
        news_link: Some("https://news.naver.com".to_string()),
        sources: Vec::new(),
    }
}
