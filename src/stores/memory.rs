//! An in-memory transaction store for tests and throwaway servers.

use std::{
    collections::{BTreeMap, HashSet},
    sync::{Arc, RwLock},
};

use time::{OffsetDateTime, UtcOffset};

use crate::{
    Error,
    models::{DatabaseID, NewTransaction, Transaction, TransactionStatus},
    stores::{TransactionPage, TransactionQuery, TransactionStore},
};

#[derive(Debug, Default)]
struct Inner {
    last_id: DatabaseID,
    transactions: BTreeMap<DatabaseID, Transaction>,
}

/// A thread-safe in-memory store for transactions.
///
/// Uses `Arc<RwLock<..>>` so that clones share the same transactions.
/// "Today" is measured in UTC unless set with
/// [InMemoryTransactionStore::with_local_offset].
#[derive(Debug, Clone)]
pub struct InMemoryTransactionStore {
    inner: Arc<RwLock<Inner>>,
    local_offset: UtcOffset,
}

impl Default for InMemoryTransactionStore {
    fn default() -> Self {
        Self {
            inner: Arc::default(),
            local_offset: UtcOffset::UTC,
        }
    }
}

impl InMemoryTransactionStore {
    /// Creates a new, empty in-memory transaction store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Measure "today" in the timezone with the offset `local_offset`.
    pub fn with_local_offset(mut self, local_offset: UtcOffset) -> Self {
        self.local_offset = local_offset;
        self
    }

    /// Insert `transaction` as is, keeping its ID and timestamps.
    ///
    /// Useful for setting up transactions that were created in the past.
    /// Replaces any transaction with the same ID.
    pub fn insert(&self, transaction: Transaction) -> Result<(), Error> {
        let mut inner = self.inner.write().map_err(|_| Error::DatabaseLockError)?;
        inner.last_id = inner.last_id.max(transaction.id);
        inner.transactions.insert(transaction.id, transaction);

        Ok(())
    }

    /// Poison the lock so that every later call fails with [Error::DatabaseLockError].
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let inner = self.inner.clone();
        let _ = std::thread::spawn(move || {
            let _guard = inner.write();
            panic!("poisoning the in-memory store");
        })
        .join();
    }

    fn read<T>(&self, f: impl FnOnce(&Inner) -> T) -> Result<T, Error> {
        let inner = self.inner.read().map_err(|_| Error::DatabaseLockError)?;

        Ok(f(&inner))
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn create(&self, transaction: NewTransaction) -> Result<Transaction, Error> {
        let mut inner = self.inner.write().map_err(|_| Error::DatabaseLockError)?;
        let now = OffsetDateTime::now_utc();

        inner.last_id += 1;
        let transaction = Transaction {
            id: inner.last_id,
            user_id: transaction.user_id,
            amount: transaction.amount,
            status: transaction.status,
            created_at: now,
            updated_at: now,
        };
        inner
            .transactions
            .insert(transaction.id, transaction.clone());

        Ok(transaction)
    }

    fn get(&self, id: DatabaseID) -> Result<Transaction, Error> {
        self.read(|inner| inner.transactions.get(&id).cloned())?
            .ok_or(Error::NotFound)
    }

    fn update_status(
        &self,
        id: DatabaseID,
        status: TransactionStatus,
    ) -> Result<Transaction, Error> {
        let mut inner = self.inner.write().map_err(|_| Error::DatabaseLockError)?;
        let transaction = inner.transactions.get_mut(&id).ok_or(Error::NotFound)?;

        transaction.status = status;
        transaction.updated_at = OffsetDateTime::now_utc();

        Ok(transaction.clone())
    }

    fn delete(&self, id: DatabaseID) -> Result<(), Error> {
        let mut inner = self.inner.write().map_err(|_| Error::DatabaseLockError)?;

        inner
            .transactions
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::NotFound)
    }

    fn get_query(&self, query: TransactionQuery) -> Result<TransactionPage, Error> {
        self.read(|inner| {
            let matching: Vec<_> = inner
                .transactions
                .values()
                .filter(|transaction| query.matches(transaction))
                .collect();

            let transactions = matching
                .iter()
                .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
                .take(usize::try_from(query.page_size).unwrap_or(usize::MAX))
                .map(|&transaction| transaction.clone())
                .collect();

            TransactionPage {
                transactions,
                total_record_count: matching.len() as u64,
            }
        })
    }

    fn count(&self, status: Option<TransactionStatus>) -> Result<u64, Error> {
        self.read(|inner| {
            inner
                .transactions
                .values()
                .filter(|transaction| status.is_none_or(|status| transaction.status == status))
                .count() as u64
        })
    }

    fn count_today(&self, status: Option<TransactionStatus>) -> Result<u64, Error> {
        let today = OffsetDateTime::now_utc().to_offset(self.local_offset).date();

        self.read(|inner| {
            inner
                .transactions
                .values()
                .filter(|transaction| {
                    transaction.created_at.to_offset(self.local_offset).date() == today
                        && status.is_none_or(|status| transaction.status == status)
                })
                .count() as u64
        })
    }

    fn count_unique_users(&self) -> Result<u64, Error> {
        self.read(|inner| {
            inner
                .transactions
                .values()
                .map(|transaction| transaction.user_id)
                .collect::<HashSet<_>>()
                .len() as u64
        })
    }

    fn latest(&self, limit: u64) -> Result<Vec<Transaction>, Error> {
        self.read(|inner| {
            let mut transactions: Vec<_> = inner.transactions.values().cloned().collect();
            transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            transactions.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
            transactions
        })
    }
}
