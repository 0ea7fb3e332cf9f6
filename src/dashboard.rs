//! Read-only aggregate views over the transaction store.
//!
//! Every view is recomputed from the store on each call. The queries that make
//! up a view run one after another, so concurrent writes may leave a view
//! slightly inconsistent (e.g., the per-status counts not adding up to the
//! total).

use serde::{Deserialize, Serialize};

use crate::{Error, models::Transaction, stores::TransactionStore};

/// The number of transactions included in [DashboardReport::latest_transactions].
pub const LATEST_TRANSACTIONS_LIMIT: u64 = 10;

/// Today's successes, the average transactions per user and the newest transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    /// The number of successful transactions created today.
    pub total_success_today: u64,
    /// The number of transactions per distinct user, rounded to two decimal places.
    pub average_transaction_per_user: f64,
    /// The newest transactions, newest first.
    pub latest_transactions: Vec<Transaction>,
}

/// Transaction counts, overall, for today and per status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    /// The number of transactions created today.
    pub total_transactions_today: u64,
    /// The number of transactions per distinct user.
    pub average_transaction_per_user: f64,
    /// The number of transactions.
    pub total_transactions: u64,
    /// The number of distinct users with transactions.
    pub unique_users: u64,
    /// The number of pending transactions.
    pub total_pending_transactions: u64,
    /// The number of successful transactions.
    pub total_success_transactions: u64,
    /// The number of failed transactions.
    pub total_failed_transactions: u64,
}

/// Computes the dashboard views from a [TransactionStore].
#[derive(Debug, Clone)]
pub struct Dashboard<T> {
    store: T,
}

impl<T> Dashboard<T>
where
    T: TransactionStore,
{
    /// Create a dashboard that reads from `store`.
    pub fn new(store: T) -> Self {
        Self { store }
    }

    /// Compute the dashboard report.
    ///
    /// # Errors
    /// Returns the first error from the store, no partial report is produced.
    pub fn report(&self) -> Result<DashboardReport, Error> {
        let total_success_today = self.store.count_success_today()?;
        let total_transactions = self.store.count_total()?;
        let unique_users = self.store.count_unique_users()?;
        let latest_transactions = self.store.latest(LATEST_TRANSACTIONS_LIMIT)?;

        Ok(DashboardReport {
            total_success_today,
            average_transaction_per_user: round_to_cents(average_per_user(
                total_transactions,
                unique_users,
            )),
            latest_transactions,
        })
    }

    /// Compute the transaction summary.
    ///
    /// # Errors
    /// Returns the first error from the store, no partial summary is produced.
    pub fn summary(&self) -> Result<TransactionSummary, Error> {
        use crate::models::TransactionStatus::{Failed, Pending, Success};

        let total_transactions_today = self.store.count_today(None)?;
        let total_transactions = self.store.count_total()?;
        let unique_users = self.store.count_unique_users()?;
        let total_pending_transactions = self.store.count(Some(Pending))?;
        let total_success_transactions = self.store.count(Some(Success))?;
        let total_failed_transactions = self.store.count(Some(Failed))?;

        Ok(TransactionSummary {
            total_transactions_today,
            average_transaction_per_user: average_per_user(total_transactions, unique_users),
            total_transactions,
            unique_users,
            total_pending_transactions,
            total_success_transactions,
            total_failed_transactions,
        })
    }
}

/// The mean number of transactions per user, zero when there are no users.
fn average_per_user(total_transactions: u64, unique_users: u64) -> f64 {
    if unique_users == 0 {
        return 0.0;
    }

    total_transactions as f64 / unique_users as f64
}

/// Round to two decimal places, halves away from zero.
fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
