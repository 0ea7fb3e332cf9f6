//! Defines the transaction store trait.

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    models::{DatabaseID, NewTransaction, Transaction, TransactionStatus, UserID},
};

/// Handles the creation, retrieval and aggregation of transactions.
///
/// Implementations own their synchronization, so every method takes `&self`
/// and clones of a store share the same underlying data.
pub trait TransactionStore {
    /// Create a new transaction in the store.
    ///
    /// The store assigns the ID and sets `created_at` and `updated_at` to the
    /// current time.
    fn create(&self, transaction: NewTransaction) -> Result<Transaction, Error>;

    /// Retrieve a transaction from the store.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not refer to a stored transaction.
    fn get(&self, id: DatabaseID) -> Result<Transaction, Error>;

    /// Set the status of the transaction `id` and bump its `updated_at`.
    ///
    /// The update either fully applies or not at all.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not refer to a stored transaction.
    fn update_status(&self, id: DatabaseID, status: TransactionStatus)
    -> Result<Transaction, Error>;

    /// Remove the transaction `id` from the store.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no transaction was removed.
    fn delete(&self, id: DatabaseID) -> Result<(), Error>;

    /// Retrieve one page of the transactions matching the filters in `query`,
    /// along with the number of matching transactions over all pages.
    fn get_query(&self, query: TransactionQuery) -> Result<TransactionPage, Error>;

    /// Count the transactions in the store, optionally only those with `status`.
    fn count(&self, status: Option<TransactionStatus>) -> Result<u64, Error>;

    /// Count the transactions created today, optionally only those with `status`.
    ///
    /// What "today" means is up to the store's notion of local time.
    fn count_today(&self, status: Option<TransactionStatus>) -> Result<u64, Error>;

    /// Count the distinct users that own at least one transaction.
    fn count_unique_users(&self) -> Result<u64, Error>;

    /// Retrieve up to `limit` transactions, newest first.
    fn latest(&self, limit: u64) -> Result<Vec<Transaction>, Error>;

    /// Count all transactions in the store.
    fn count_total(&self) -> Result<u64, Error> {
        self.count(None)
    }

    /// Count the successful transactions created today.
    fn count_success_today(&self) -> Result<u64, Error> {
        self.count_today(Some(TransactionStatus::Success))
    }
}

/// Defines how transactions should be fetched from [TransactionStore::get_query].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionQuery {
    /// The 1-based page to fetch.
    pub page_number: u64,
    /// The maximum number of transactions on a page.
    pub page_size: u64,
    /// Only include transactions with this status.
    pub status: Option<TransactionStatus>,
    /// Only include transactions owned by this user.
    pub user_id: Option<UserID>,
}

impl TransactionQuery {
    /// The number of transactions to skip to reach the start of the page.
    pub fn offset(&self) -> u64 {
        self.page_number
            .saturating_sub(1)
            .saturating_mul(self.page_size)
    }

    /// Whether `transaction` passes the status and user filters.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.status.is_none_or(|status| transaction.status == status)
            && self
                .user_id
                .is_none_or(|user_id| transaction.user_id == user_id)
    }
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: 10,
            status: None,
            user_id: None,
        }
    }
}

/// A page of transactions returned by [TransactionStore::get_query].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPage {
    /// The transactions on the requested page, in ascending ID order.
    pub transactions: Vec<Transaction>,
    /// The number of transactions matching the filters across all pages.
    pub total_record_count: u64,
}
