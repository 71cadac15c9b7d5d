//! Periodic weather fetching.
//!
//! Each cycle fetches a snapshot, publishes it, then asks for an illustration of its image prompt.
//! A failed cycle sets the error status but keeps whatever was shown before.

use crate::api::Assistant;
use crate::model::{GeneratedImage, WeatherSnapshot, WeatherStatus};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// The default time between weather fetches.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// What the view shows for the weather.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherView {
    pub status: WeatherStatus,
    pub snapshot: Option<WeatherSnapshot>,
    #[serde(skip)]
    pub image: Option<GeneratedImage>,
}

/// Fetches weather and publishes the result. Clones share the published state.
#[derive(Clone)]
pub struct WeatherPoller {
    assistant: Arc<dyn Assistant>,
    location: String,
    state: Arc<watch::Sender<WeatherView>>,
}

impl WeatherPoller {
    /// `location` names the fallback snapshot shown when the first fetch fails.
    pub fn new(assistant: Arc<dyn Assistant>, location: impl Into<String>) -> Self {
        let (state, _) = watch::channel(WeatherView::default());
        Self {
            assistant,
            location: location.into(),
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<WeatherView> {
        self.state.subscribe()
    }

    pub fn current(&self) -> WeatherView {
        self.state.borrow().clone()
    }

    /// Runs one fetch cycle.
    pub async fn refresh(&self) {
        self.state.send_modify(|view| view.status = WeatherStatus::Loading);

        let snapshot = match self.assistant.weather().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Unable to fetch the weather: {e:#}");
                let location = &self.location;
                self.state.send_modify(|view| {
                    view.status = WeatherStatus::Error;
                    if view.snapshot.is_none() {
                        view.snapshot = Some(WeatherSnapshot::fallback(location.as_str()));
                    }
                });
                return;
            }
        };
        info!(
            "Weather for {}: {} {}°",
            snapshot.location, snapshot.condition, snapshot.current_temp
        );

        let prompt = snapshot.image_prompt.trim().to_string();
        self.state
            .send_modify(|view| view.snapshot = Some(snapshot));

        if prompt.is_empty() {
            debug!("The weather report has no image prompt");
            self.state
                .send_modify(|view| view.status = WeatherStatus::Success);
            return;
        }

        let image = match self.assistant.image(&prompt).await {
            Ok(image) => image,
            Err(e) => {
                warn!("Unable to generate the weather image: {e:#}");
                None
            }
        };
        self.state.send_modify(|view| {
            view.image = image;
            view.status = WeatherStatus::Success;
        });
    }

    /// Starts fetching immediately and then every `every`. The returned task runs until aborted.
    pub fn spawn(&self, every: Duration) -> JoinHandle<()> {
        let poller = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                poller.refresh().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AssistantCall, TestAssistant};
    use tokio::time::sleep;

    fn poller(assistant: &TestAssistant) -> WeatherPoller {
        WeatherPoller::new(Arc::new(assistant.clone()), "Busan")
    }

    #[tokio::test]
    async fn test_refresh_success() {
        let assistant = TestAssistant::new();
        let poller = poller(&assistant);
        assert_eq!(poller.current().status, WeatherStatus::Idle);

        poller.refresh().await;
        let view = poller.current();
        assert_eq!(view.status, WeatherStatus::Success);
        let snapshot = view.snapshot.unwrap();
        assert!(view.image.is_some());
        assert_eq!(
            assistant.calls().await,
            vec![
                AssistantCall::Weather,
                AssistantCall::Image(snapshot.image_prompt.clone()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_is_published_before_the_image() {
        let assistant = TestAssistant::new();
        assistant
            .update(|s| s.latency = Duration::from_secs(1))
            .await;
        let poller = poller(&assistant);
        let background = poller.clone();
        let task = tokio::spawn(async move { background.refresh().await });

        sleep(Duration::from_millis(1500)).await;
        let view = poller.current();
        assert_eq!(view.status, WeatherStatus::Loading);
        assert!(view.snapshot.is_some());
        assert!(view.image.is_none());

        task.await.unwrap();
        let view = poller.current();
        assert_eq!(view.status, WeatherStatus::Success);
        assert!(view.image.is_some());
    }

    #[tokio::test]
    async fn test_first_failure_shows_fallback() {
        let assistant = TestAssistant::new();
        assistant.update(|s| s.weather = None).await;
        let poller = poller(&assistant);
        poller.refresh().await;

        let view = poller.current();
        assert_eq!(view.status, WeatherStatus::Error);
        assert_eq!(view.snapshot, Some(WeatherSnapshot::fallback("Busan")));
        assert!(view.image.is_none());
        assert_eq!(assistant.calls().await, vec![AssistantCall::Weather]);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_snapshot_and_image() {
        let assistant = TestAssistant::new();
        let poller = poller(&assistant);
        poller.refresh().await;
        let before = poller.current();

        assistant.update(|s| s.weather = None).await;
        poller.refresh().await;
        let after = poller.current();
        assert_eq!(after.status, WeatherStatus::Error);
        assert_eq!(after.snapshot, before.snapshot);
        assert_eq!(after.image, before.image);

        // A later success recovers.
        assistant
            .update(|s| *s = crate::api::TestAssistantState::default())
            .await;
        poller.refresh().await;
        assert_eq!(poller.current().status, WeatherStatus::Success);
    }

    #[tokio::test]
    async fn test_image_failure_is_still_success() {
        let assistant = TestAssistant::new();
        assistant.update(|s| s.image_fails = true).await;
        let poller = poller(&assistant);
        poller.refresh().await;

        let view = poller.current();
        assert_eq!(view.status, WeatherStatus::Success);
        assert!(view.snapshot.is_some());
        assert!(view.image.is_none());
    }

    #[tokio::test]
    async fn test_empty_prompt_skips_image() {
        let assistant = TestAssistant::new();
        assistant
            .update(|s| {
                if let Some(weather) = s.weather.as_mut() {
                    weather.image_prompt = "  ".to_string();
                }
            })
            .await;
        let poller = poller(&assistant);
        poller.refresh().await;

        assert_eq!(poller.current().status, WeatherStatus::Success);
        assert_eq!(assistant.calls().await, vec![AssistantCall::Weather]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_fetches_immediately_and_on_interval() {
        let assistant = TestAssistant::new();
        let poller = poller(&assistant);
        let task = poller.spawn(DEFAULT_INTERVAL);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(assistant.calls().await.len(), 2);
        assert_eq!(poller.current().status, WeatherStatus::Success);

        sleep(DEFAULT_INTERVAL).await;
        assert_eq!(assistant.calls().await.len(), 4);

        task.abort();
        sleep(DEFAULT_INTERVAL * 2).await;
        assert_eq!(assistant.calls().await.len(), 4);
    }
}
