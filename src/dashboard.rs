//! The live dashboard: clock, weather and the spending ledger for a selected day.
//!
//! Mounting a `Dashboard` starts the clock ticker and the weather poller and schedules the first
//! spending comment. Dropping it stops all of them.

use crate::api::Assistant;
use crate::clock::{Clock, ClockFace};
use crate::commentary::{Commentary, CommentaryTrigger};
use crate::ledger::Ledger;
use crate::model::{Amount, Category, Transaction};
use crate::weather::{WeatherPoller, WeatherView};
use crate::{Config, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Everything needed to draw one frame of the dashboard.
#[derive(Debug, Clone)]
pub struct Frame {
    pub timezone: Tz,
    pub clock: ClockFace,
    pub weather: WeatherView,
    pub selected_day: NaiveDate,
    pub transactions: Vec<Transaction>,
    pub total: Amount,
    pub commentary: Commentary,
    pub shortcuts_open: bool,
}

pub struct Dashboard {
    clock: Clock,
    weather: WeatherPoller,
    ledger: Ledger,
    commentary: CommentaryTrigger,
    selected_day: NaiveDate,
    shortcuts_open: bool,
    tasks: Vec<JoinHandle<()>>,
}

impl Dashboard {
    /// Starts the timers and selects today.
    pub async fn mount(config: &Config, ledger: Ledger, assistant: Arc<dyn Assistant>) -> Self {
        let clock = Clock::new(ledger.timezone());
        let weather = WeatherPoller::new(assistant.clone(), config.location());
        let tasks = vec![clock.spawn(), weather.spawn(config.weather_interval())];
        let commentary = CommentaryTrigger::new(assistant, config.commentary_debounce());
        let selected_day = ledger.today();
        debug!("Mounting the dashboard for {selected_day}");

        let mut dashboard = Self {
            clock,
            weather,
            ledger,
            commentary,
            selected_day,
            shortcuts_open: false,
            tasks,
        };
        dashboard.observe_spending().await;
        dashboard
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn weather(&self) -> &WeatherPoller {
        &self.weather
    }

    pub fn commentary(&self) -> &CommentaryTrigger {
        &self.commentary
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn selected_day(&self) -> NaiveDate {
        self.selected_day
    }

    /// Records a transaction on the selected day. See `Ledger::add`.
    pub async fn add(&mut self, amount: &str, category: Option<Category>) -> Result<Option<Transaction>> {
        let added = self.ledger.add(amount, category, self.selected_day).await;
        self.observe_spending().await;
        added
    }

    /// Deletes a transaction. See `Ledger::remove`.
    pub async fn remove(&mut self, id: &str) -> Result<Option<Transaction>> {
        let removed = self.ledger.remove(id).await;
        self.observe_spending().await;
        removed
    }

    pub async fn select_day(&mut self, day: NaiveDate) {
        self.selected_day = day;
        self.observe_spending().await;
    }

    pub fn toggle_shortcuts(&mut self) -> bool {
        self.shortcuts_open = !self.shortcuts_open;
        self.shortcuts_open
    }

    /// Starts an extra weather fetch in the background.
    pub fn refresh_weather(&mut self) {
        let weather = self.weather.clone();
        self.tasks.retain(|task| !task.is_finished());
        self.tasks
            .push(tokio::spawn(async move { weather.refresh().await }));
    }

    /// The selected day's transactions, newest first.
    pub fn selected_transactions(&self) -> Vec<Transaction> {
        self.ledger
            .transactions_for(self.selected_day)
            .cloned()
            .collect()
    }

    pub fn frame(&self) -> Frame {
        Frame {
            timezone: self.ledger.timezone(),
            clock: self.clock.current(),
            weather: self.weather.current(),
            selected_day: self.selected_day,
            transactions: self.selected_transactions(),
            total: self.ledger.total_for(self.selected_day),
            commentary: self.commentary.current(),
            shortcuts_open: self.shortcuts_open,
        }
    }

    async fn observe_spending(&mut self) {
        let day = self.selected_day;
        let total = self.ledger.total_for(day);
        let categories = self.ledger.categories_for(day);
        self.commentary.observe(day, total, categories).await;
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AssistantCall;
    use crate::commentary::NO_SPENDING_COMMENT;
    use crate::model::WeatherStatus;
    use crate::test::TestEnv;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_mount_fetches_weather_and_celebrates_empty_day() {
        let env = TestEnv::new().await;
        let dashboard = env.dashboard().await;
        sleep(Duration::from_secs(1)).await;

        let frame = dashboard.frame();
        assert_eq!(frame.selected_day, dashboard.ledger().today());
        assert_eq!(frame.weather.status, WeatherStatus::Success);
        assert!(frame.weather.image.is_some());
        assert_eq!(frame.total, Amount::ZERO);
        assert_eq!(frame.commentary.comment, NO_SPENDING_COMMENT);
        assert!(!frame.shortcuts_open);

        let calls = env.assistant().calls().await;
        assert_eq!(calls[0], AssistantCall::Weather);
        assert!(!calls
            .iter()
            .any(|c| matches!(c, AssistantCall::SpendingComment { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_and_remove_update_commentary() {
        let env = TestEnv::new().await;
        let mut dashboard = env.dashboard().await;
        sleep(Duration::from_secs(1)).await;

        let added = dashboard
            .add("60,000", Some(Category::Shopping))
            .await
            .unwrap()
            .unwrap();
        sleep(Duration::from_secs(1)).await;

        let frame = dashboard.frame();
        assert_eq!(frame.transactions, vec![added.clone()]);
        assert_eq!(frame.total, Amount::new(60000).unwrap());
        assert!(env.assistant().calls().await.contains(
            &AssistantCall::SpendingComment {
                total: Amount::new(60000).unwrap(),
                categories: vec![Category::Shopping],
            }
        ));
        assert_ne!(frame.commentary.comment, NO_SPENDING_COMMENT);

        dashboard.remove(added.id()).await.unwrap();
        sleep(Duration::from_secs(1)).await;
        assert_eq!(dashboard.frame().commentary.comment, NO_SPENDING_COMMENT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_day_filters_transactions() {
        let env = TestEnv::new().await;
        let mut dashboard = env.dashboard().await;
        let today = dashboard.selected_day();
        let yesterday = today.pred_opt().unwrap();

        dashboard.add("1000", Some(Category::Food)).await.unwrap();
        dashboard.select_day(yesterday).await;
        assert!(dashboard.frame().transactions.is_empty());
        dashboard.add("2000", Some(Category::Snack)).await.unwrap();
        assert_eq!(dashboard.frame().total, Amount::new(2000).unwrap());

        dashboard.select_day(today).await;
        assert_eq!(dashboard.frame().total, Amount::new(1000).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_weather_polling() {
        let env = TestEnv::new().await;
        let dashboard = env.dashboard().await;
        sleep(Duration::from_secs(1)).await;
        let before = env.assistant().calls().await.len();
        drop(dashboard);

        sleep(Duration::from_secs(2 * 60 * 60)).await;
        assert_eq!(env.assistant().calls().await.len(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_weather_and_toggle_shortcuts() {
        let env = TestEnv::new().await;
        let mut dashboard = env.dashboard().await;
        sleep(Duration::from_secs(1)).await;
        let before = env.assistant().calls().await.len();

        dashboard.refresh_weather();
        sleep(Duration::from_secs(1)).await;
        assert_eq!(env.assistant().calls().await.len(), before + 2);

        assert!(dashboard.toggle_shortcuts());
        assert!(dashboard.frame().shortcuts_open);
        assert!(!dashboard.toggle_shortcuts());
    }
}
