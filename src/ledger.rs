//! The spending ledger: an insertion-ordered list of transactions mirrored to a key-value store.
//!
//! The whole list is serialized under `LEDGER_KEY` after every mutation and read once when the
//! ledger is loaded. Transactions are grouped by calendar day in the dashboard's timezone.

use crate::backup::{Backup, UNREADABLE_LEDGER};
use crate::model::{Amount, Category, Transaction};
use crate::store::KeyValueStore;
use crate::Result;
use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SubsecRound, TimeZone, Utc};
use chrono_tz::Tz;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// The key under which the ledger is persisted.
pub const LEDGER_KEY: &str = "daydash_ledger";

/// The list of transactions, newest first, together with the store it is persisted to.
pub struct Ledger {
    store: Box<dyn KeyValueStore>,
    transactions: Vec<Transaction>,
    tz: Tz,
}

impl Ledger {
    /// Loads the ledger from `store`. Missing data is an empty ledger. Data that cannot be read or
    /// parsed is also treated as an empty ledger; if `backup` is given, the unparseable text is
    /// saved there first.
    pub async fn load(store: Box<dyn KeyValueStore>, tz: Tz, backup: Option<&Backup>) -> Self {
        let stored = match store.get(LEDGER_KEY).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Unable to read the stored ledger, starting empty: {e:#}");
                None
            }
        };

        let transactions = match stored {
            None => {
                debug!("No stored ledger found");
                Vec::new()
            }
            Some(text) => match serde_json::from_str::<Vec<Transaction>>(&text) {
                Ok(transactions) => dedupe(transactions),
                Err(e) => {
                    warn!("The stored ledger could not be parsed, starting empty: {e}");
                    if let Some(backup) = backup {
                        match backup.save_raw(UNREADABLE_LEDGER, &text).await {
                            Ok(path) => warn!("The unreadable ledger was saved to {}", path.display()),
                            Err(e) => warn!("Unable to save a copy of the unreadable ledger: {e:#}"),
                        }
                    }
                    Vec::new()
                }
            },
        };
        debug!("Loaded {} transactions", transactions.len());

        Self {
            store,
            transactions,
            tz,
        }
    }

    /// The timezone that defines calendar days for this ledger.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Today's calendar day in the ledger's timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    /// All transactions, newest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Records a new transaction on `day` at the current time of day.
    ///
    /// `amount` is raw user input; non-digit characters are ignored. Nothing is recorded, and
    /// `Ok(None)` is returned, if `amount` contains no digits, exceeds the maximum amount, or
    /// `category` is `None`.
    pub async fn add(
        &mut self,
        amount: &str,
        category: Option<Category>,
        day: NaiveDate,
    ) -> Result<Option<Transaction>> {
        self.add_at(amount, category, day, Utc::now()).await
    }

    /// Same as `add` with an explicit "now" whose time of day is combined with `day`.
    pub async fn add_at(
        &mut self,
        amount: &str,
        category: Option<Category>,
        day: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<Transaction>> {
        let Some(category) = category else {
            trace!("Ignoring a transaction without a category");
            return Ok(None);
        };
        let amount = match Amount::from_str(amount) {
            Ok(amount) => amount,
            Err(e) => {
                trace!("Ignoring a transaction with an unusable amount: {e}");
                return Ok(None);
            }
        };

        // Persisted timestamps carry milliseconds only.
        let time_of_day = now.trunc_subsecs(3).with_timezone(&self.tz).time();
        let date = local_instant(&self.tz, day.and_time(time_of_day));
        let transaction = Transaction::new(amount, category, date);
        debug!(
            "Adding transaction {} of {} for {}",
            transaction.id(),
            amount,
            category
        );

        self.transactions.insert(0, transaction.clone());
        if let Err(e) = self.persist().await {
            let _ = self.transactions.remove(0);
            return Err(e);
        }
        Ok(Some(transaction))
    }

    /// Deletes the transaction with `id`. Returns the deleted transaction, or `None` if no
    /// transaction has that id.
    pub async fn remove(&mut self, id: &str) -> Result<Option<Transaction>> {
        let Some(ix) = self.transactions.iter().position(|t| t.id() == id) else {
            trace!("No transaction with id {id} to remove");
            return Ok(None);
        };
        let removed = self.transactions.remove(ix);
        if let Err(e) = self.persist().await {
            self.transactions.insert(ix, removed);
            return Err(e);
        }
        debug!("Removed transaction {id}");
        Ok(Some(removed))
    }

    /// The transactions on `day`, in ledger order (newest first).
    pub fn transactions_for(&self, day: NaiveDate) -> impl Iterator<Item = &Transaction> + '_ {
        let tz = self.tz;
        self.transactions
            .iter()
            .filter(move |t| t.day_in(&tz) == day)
    }

    /// The sum of the amounts on `day`.
    pub fn total_for(&self, day: NaiveDate) -> Amount {
        self.transactions_for(day).map(Transaction::amount).sum()
    }

    /// The category of each transaction on `day`, in ledger order.
    pub fn categories_for(&self, day: NaiveDate) -> Vec<Category> {
        self.transactions_for(day).map(Transaction::category).collect()
    }

    /// Gives back the store, e.g. to load it again.
    pub fn into_store(self) -> Box<dyn KeyValueStore> {
        self.store
    }

    async fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.transactions)
            .context("Unable to serialize the ledger")?;
        self.store
            .set(LEDGER_KEY, json)
            .await
            .context("Unable to persist the ledger")
    }
}

/// Drops transactions whose id was already seen, keeping the first occurrence.
fn dedupe(transactions: Vec<Transaction>) -> Vec<Transaction> {
    let mut seen = HashSet::new();
    let before = transactions.len();
    let unique: Vec<Transaction> = transactions
        .into_iter()
        .filter(|t| seen.insert(t.id().to_string()))
        .collect();
    if unique.len() < before {
        warn!(
            "Dropped {} stored transactions with duplicate ids",
            before - unique.len()
        );
    }
    unique
}

/// Resolves a wall-clock time in `tz` to an instant. Ambiguous times take the earlier instant;
/// times skipped by a daylight-saving jump move forward by an hour.
fn local_instant(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}
