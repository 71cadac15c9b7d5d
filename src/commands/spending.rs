//! One-shot commands over the spending ledger.

use crate::api::{self, Mode};
use crate::clock::month_day_label;
use crate::commands::{open_ledger, Out};
use crate::commentary::comment_for;
use crate::model::{Amount, Category, Transaction};
use crate::view::render_transactions;
use crate::{Config, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// A day's transactions and their total.
#[derive(Debug, Clone, Serialize)]
pub struct DaySpending {
    pub day: NaiveDate,
    pub total: Amount,
    pub transactions: Vec<Transaction>,
}

/// Records a transaction on `day` (default today). Unusable input records nothing and is
/// reported in the message rather than as an error.
pub async fn add(
    config: Config,
    amount: &str,
    category: Category,
    day: Option<NaiveDate>,
) -> Result<Out<Transaction>> {
    let mut ledger = open_ledger(&config).await?;
    let day = day.unwrap_or_else(|| ledger.today());
    match ledger.add(amount, Some(category), day).await? {
        Some(t) => Ok(Out::new(
            format!(
                "Recorded ₩{} for {} on {} ({})",
                t.amount(),
                category.label(),
                month_day_label(day),
                t.id()
            ),
            t,
        )),
        None => Ok(format!("Nothing was recorded, '{amount}' is not a usable amount").into()),
    }
}

/// Deletes the transaction with `id`. A missing id is reported in the message.
pub async fn delete(config: Config, id: &str) -> Result<Out<Transaction>> {
    let mut ledger = open_ledger(&config).await?;
    match ledger.remove(id).await? {
        Some(t) => Ok(Out::new(
            format!("Deleted ₩{} for {}", t.amount(), t.category().label()),
            t,
        )),
        None => Ok(format!("There is no transaction with id {id}").into()),
    }
}

/// Lists the transactions on `day` (default today), newest first.
pub async fn list(config: Config, day: Option<NaiveDate>) -> Result<Out<DaySpending>> {
    let ledger = open_ledger(&config).await?;
    let day = day.unwrap_or_else(|| ledger.today());
    let spending = DaySpending {
        day,
        total: ledger.total_for(day),
        transactions: ledger.transactions_for(day).cloned().collect(),
    };
    let message = format!(
        "{} 쓴 돈  ₩{}\n{}",
        month_day_label(day),
        spending.total,
        render_transactions(&spending.transactions, ledger.timezone())
    );
    Ok(Out::new(message.trim_end(), spending))
}

/// Produces the spending comment for `day` (default today) without waiting for a debounce.
pub async fn comment(config: Config, mode: Mode, day: Option<NaiveDate>) -> Result<Out<String>> {
    let ledger = open_ledger(&config).await?;
    let day = day.unwrap_or_else(|| ledger.today());
    let assistant = api::assistant(&config, mode)?;
    let comment = comment_for(
        assistant.as_ref(),
        ledger.total_for(day),
        &ledger.categories_for(day),
    )
    .await;
    Ok(Out::new(comment.clone(), comment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commentary::NO_SPENDING_COMMENT;
    use crate::test::TestEnv;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
    }

    #[tokio::test]
    async fn test_add_list_delete() {
        let env = TestEnv::new().await;
        let out = add(env.config(), "12,000", Category::Food, Some(day()))
            .await
            .unwrap();
        let added = out.structure().unwrap().clone();
        assert_eq!(added.amount(), Amount::new(12000).unwrap());
        assert!(out.message().contains("₩12,000"));

        add(env.config(), "500", Category::Snack, Some(day()))
            .await
            .unwrap();
        let listed = list(env.config(), Some(day())).await.unwrap();
        let spending = listed.structure().unwrap();
        assert_eq!(spending.total, Amount::new(12500).unwrap());
        assert_eq!(spending.transactions.len(), 2);
        assert_eq!(spending.transactions[1], added);
        assert!(listed.message().starts_with("3월 7일 쓴 돈  ₩12,500"));

        let deleted = delete(env.config(), added.id()).await.unwrap();
        assert_eq!(deleted.structure(), Some(&added));
        let missing = delete(env.config(), added.id()).await.unwrap();
        assert!(missing.structure().is_none());

        let listed = list(env.config(), Some(day())).await.unwrap();
        assert_eq!(listed.structure().unwrap().total, Amount::new(500).unwrap());
    }

    #[tokio::test]
    async fn test_add_unusable_amount() {
        let env = TestEnv::new().await;
        let out = add(env.config(), "abc", Category::Food, Some(day()))
            .await
            .unwrap();
        assert!(out.structure().is_none());
        assert!(env.file_ledger().await.is_empty());
    }

    #[tokio::test]
    async fn test_comment_on_empty_day() {
        let env = TestEnv::new().await;
        let out = comment(env.config(), Mode::Test, Some(day())).await.unwrap();
        assert_eq!(out.message(), NO_SPENDING_COMMENT);
    }

    #[tokio::test]
    async fn test_comment_in_test_mode() {
        let env = TestEnv::new().await;
        add(env.config(), "60000", Category::Shopping, Some(day()))
            .await
            .unwrap();
        let out = comment(env.config(), Mode::Test, Some(day())).await.unwrap();
        assert_ne!(out.message(), NO_SPENDING_COMMENT);
        assert!(!out.message().is_empty());
    }
}
