use crate::model::{Amount, Category};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single spending entry in the ledger. Transactions are never edited after they are created,
/// they are only added or deleted.
///
/// Serialized as `{"id": "...", "amount": 12000, "category": "food", "date": 1760688000000}`
/// where `date` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: String,
    amount: Amount,
    category: Category,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    date: DateTime<Utc>,
}

impl Transaction {
    /// Creates a transaction with a freshly generated id.
    pub fn new(amount: Amount, category: Category, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            amount,
            category,
            date,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_id(
        id: impl Into<String>,
        amount: u64,
        category: Category,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            amount: Amount::new(amount).unwrap(),
            category,
            date,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// The calendar day this transaction falls on when viewed in `tz`.
    pub fn day_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.date.with_timezone(tz).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Seoul;

    #[test]
    fn test_new_generates_unique_ids() {
        let amount = Amount::new(100).unwrap();
        let a = Transaction::new(amount, Category::Food, Utc::now());
        let b = Transaction::new(amount, Category::Food, Utc::now());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_serialize_date_as_epoch_millis() {
        let date = Utc.timestamp_millis_opt(1_760_688_000_123).unwrap();
        let t = Transaction::with_id("abc", 12000, Category::Snack, date);
        let value = serde_json::to_value(&t).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "abc",
                "amount": 12000,
                "category": "snack",
                "date": 1_760_688_000_123_i64,
            })
        );
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{"id":"x1","amount":5500,"category":"shopping","date":1760688000000}"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.id(), "x1");
        assert_eq!(t.amount().value(), 5500);
        assert_eq!(t.category(), Category::Shopping);
        assert_eq!(t.date().timestamp_millis(), 1_760_688_000_000);
    }

    #[test]
    fn test_deserialize_rejects_unknown_category() {
        let json = r#"{"id":"x1","amount":5500,"category":"rent","date":1760688000000}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }

    #[test]
    fn test_day_in_timezone() {
        // 2025-10-16 20:00 UTC is already 2025-10-17 05:00 in Seoul.
        let date = Utc.with_ymd_and_hms(2025, 10, 16, 20, 0, 0).unwrap();
        let t = Transaction::with_id("a", 1, Category::Other, date);
        assert_eq!(t.day_in(&Utc), NaiveDate::from_ymd_opt(2025, 10, 16).unwrap());
        assert_eq!(t.day_in(&Seoul), NaiveDate::from_ymd_opt(2025, 10, 17).unwrap());
    }
}
