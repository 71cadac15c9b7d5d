//! Debounced AI commentary on the selected day's spending.
//!
//! The trigger watches `(selected day, total)`. Every change cancels the pending request and
//! schedules a new one after a quiet period. Each schedule is numbered, and a result is applied
//! only if its number is still the latest one issued.

use crate::api::Assistant;
use crate::model::{Amount, Category};
use chrono::NaiveDate;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Shown instead of asking the assistant when nothing was spent.
pub const NO_SPENDING_COMMENT: &str = "오늘도 무지출 챌린지 성공? 멋져요! 👍";

/// Shown when the assistant could not produce a comment.
pub const UNAVAILABLE_COMMENT: &str = "소비 요정의 컨디션이 좋지 않네요.";

/// The default quiet period before a comment is requested.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(800);

/// What the view shows for the commentary.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Commentary {
    pub comment: String,
    pub loading: bool,
}

/// Produces the comment for a day's spending. Nothing spent gives the fixed celebration without
/// calling `assistant`, and an assistant failure gives the fixed apology.
pub async fn comment_for(
    assistant: &dyn Assistant,
    total: Amount,
    categories: &[Category],
) -> String {
    if total.is_zero() {
        return NO_SPENDING_COMMENT.to_string();
    }
    match assistant.spending_comment(total, categories).await {
        Ok(comment) => comment,
        Err(e) => {
            warn!("Unable to get a spending comment: {e:#}");
            UNAVAILABLE_COMMENT.to_string()
        }
    }
}

/// Schedules debounced commentary requests and publishes their results.
pub struct CommentaryTrigger {
    assistant: Arc<dyn Assistant>,
    debounce: Duration,
    /// The sequence number of the most recent schedule.
    latest: Arc<AtomicU64>,
    state: Arc<watch::Sender<Commentary>>,
    observed: Option<(NaiveDate, Amount)>,
    pending: Option<JoinHandle<()>>,
}

impl CommentaryTrigger {
    pub fn new(assistant: Arc<dyn Assistant>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(Commentary::default());
        Self {
            assistant,
            debounce,
            latest: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
            observed: None,
            pending: None,
        }
    }

    /// Subscribes to commentary changes.
    pub fn subscribe(&self) -> watch::Receiver<Commentary> {
        self.state.subscribe()
    }

    /// The current commentary.
    pub fn current(&self) -> Commentary {
        self.state.borrow().clone()
    }

    /// Reports the selected day and its spending. Returns `true` if a new request was scheduled,
    /// which happens on the first call and whenever `day` or `total` differs from the last call.
    pub async fn observe(&mut self, day: NaiveDate, total: Amount, categories: Vec<Category>) -> bool {
        if self.observed == Some((day, total)) {
            trace!("Commentary input for {day} is unchanged");
            return false;
        }
        self.observed = Some((day, total));

        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        debug!("Scheduling commentary #{seq} for {day} (total {total})");

        let assistant = self.assistant.clone();
        let latest = self.latest.clone();
        let state = self.state.clone();
        let debounce = self.debounce;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if !total.is_zero() {
                apply(&latest, &state, seq, |c| c.loading = true);
            }
            let comment = comment_for(assistant.as_ref(), total, &categories).await;
            apply(&latest, &state, seq, |c| {
                c.comment = comment;
                c.loading = false;
            });
        }));
        true
    }
}

impl Drop for CommentaryTrigger {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

/// Applies `change` only if `seq` is still the latest schedule. Returns whether it was applied.
fn apply<F>(latest: &AtomicU64, state: &watch::Sender<Commentary>, seq: u64, change: F) -> bool
where
    F: FnOnce(&mut Commentary),
{
    let latest = latest.load(Ordering::SeqCst);
    if latest != seq {
        trace!("Discarding stale commentary #{seq}, #{latest} is newer");
        return false;
    }
    state.send_modify(change);
    true
}
