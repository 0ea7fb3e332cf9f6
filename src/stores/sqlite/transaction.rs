//! Implements a SQLite backed transaction store.
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, NewTransaction, Transaction, TransactionStatus},
    stores::{TransactionPage, TransactionQuery, TransactionStore},
};

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, amount, status, created_at, updated_at FROM transactions";

/// Stores transactions in a SQLite database.
///
/// Timestamps are stored as UTC text so that they sort and compare in
/// chronological order.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
    local_offset: UtcOffset,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    ///
    /// "Today" is measured in UTC, see [SQLiteTransactionStore::with_local_offset].
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            connection,
            local_offset: UtcOffset::UTC,
        }
    }

    /// Measure "today" in the timezone with the offset `local_offset`.
    pub fn with_local_offset(mut self, local_offset: UtcOffset) -> Self {
        self.local_offset = local_offset;
        self
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)
    }

    /// The start (inclusive) and end (exclusive) of the current local day, in UTC.
    fn today(&self) -> (OffsetDateTime, OffsetDateTime) {
        let local_now = OffsetDateTime::now_utc().to_offset(self.local_offset);
        let start = local_now
            .date()
            .midnight()
            .assume_offset(self.local_offset)
            .to_offset(UtcOffset::UTC);

        (start, start + Duration::days(1))
    }
}

/// Convert a count or size to an SQLite integer, clamping values that do not fit.
fn to_sql_integer(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL error.
    fn create(&self, transaction: NewTransaction) -> Result<Transaction, Error> {
        let now = OffsetDateTime::now_utc();

        let transaction = self
            .connection()?
            .prepare(
                "INSERT INTO transactions (user_id, amount, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 RETURNING id, user_id, amount, status, created_at, updated_at",
            )?
            .query_row(
                (
                    transaction.user_id,
                    transaction.amount,
                    transaction.status,
                    now,
                ),
                Self::map_row,
            )?;

        tracing::debug!("Created transaction {}", transaction.id);

        Ok(transaction)
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] there is some other SQL error.
    fn get(&self, id: DatabaseID) -> Result<Transaction, Error> {
        let transaction = self
            .connection()?
            .prepare(&format!("{SELECT_COLUMNS} WHERE id = :id"))?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(transaction)
    }

    /// Set the status of a transaction in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] there is some other SQL error.
    fn update_status(
        &self,
        id: DatabaseID,
        status: TransactionStatus,
    ) -> Result<Transaction, Error> {
        let now = OffsetDateTime::now_utc();

        let transaction = self
            .connection()?
            .prepare(
                "UPDATE transactions SET status = ?1, updated_at = ?2 WHERE id = ?3
                 RETURNING id, user_id, amount, status, created_at, updated_at",
            )?
            .query_row((status, now, id), Self::map_row)?;

        tracing::debug!("Set status of transaction {id} to {status}");

        Ok(transaction)
    }

    /// Delete a transaction from the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] there is some other SQL error.
    fn delete(&self, id: DatabaseID) -> Result<(), Error> {
        let rows_affected = self
            .connection()?
            .execute("DELETE FROM transactions WHERE id = ?1", [id])?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        tracing::debug!("Deleted transaction {id}");

        Ok(())
    }

    /// Query for a page of transactions in the database.
    ///
    /// The total record count and the page are read under the same lock, so
    /// writes through this store cannot land in between.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] there is a SQL error.
    fn get_query(&self, query: TransactionQuery) -> Result<TransactionPage, Error> {
        let mut where_clause_parts = vec![];
        let mut query_parameters = vec![];

        if let Some(status) = query.status {
            where_clause_parts.push(format!("status = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(status.to_string()));
        }

        if let Some(user_id) = query.user_id {
            where_clause_parts.push(format!("user_id = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Integer(user_id));
        }

        let where_clause = if where_clause_parts.is_empty() {
            String::new()
        } else {
            String::from(" WHERE ") + &where_clause_parts.join(" AND ")
        };

        let connection = self.connection()?;

        let total_record_count: i64 = connection.query_row(
            &format!("SELECT COUNT(id) FROM transactions{where_clause}"),
            params_from_iter(query_parameters.iter()),
            |row| row.get(0),
        )?;

        let page_query = format!(
            "{SELECT_COLUMNS}{where_clause} ORDER BY id ASC LIMIT ?{} OFFSET ?{}",
            query_parameters.len() + 1,
            query_parameters.len() + 2,
        );
        query_parameters.push(Value::Integer(to_sql_integer(query.page_size)));
        query_parameters.push(Value::Integer(to_sql_integer(query.offset())));

        let transactions = connection
            .prepare(&page_query)?
            .query_map(params_from_iter(query_parameters.iter()), Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TransactionPage {
            transactions,
            total_record_count: total_record_count as u64,
        })
    }

    /// Count the transactions in the database.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] there is some SQL error.
    fn count(&self, status: Option<TransactionStatus>) -> Result<u64, Error> {
        let connection = self.connection()?;

        let count: i64 = match status {
            Some(status) => connection.query_row(
                "SELECT COUNT(id) FROM transactions WHERE status = ?1",
                [status],
                |row| row.get(0),
            )?,
            None => connection.query_row("SELECT COUNT(id) FROM transactions", [], |row| {
                row.get(0)
            })?,
        };

        Ok(count as u64)
    }

    /// Count the transactions created since the start of the current local day.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] there is some SQL error.
    fn count_today(&self, status: Option<TransactionStatus>) -> Result<u64, Error> {
        let (start, end) = self.today();
        let connection = self.connection()?;

        let count: i64 = match status {
            Some(status) => connection.query_row(
                "SELECT COUNT(id) FROM transactions
                 WHERE created_at >= ?1 AND created_at < ?2 AND status = ?3",
                (start, end, status),
                |row| row.get(0),
            )?,
            None => connection.query_row(
                "SELECT COUNT(id) FROM transactions WHERE created_at >= ?1 AND created_at < ?2",
                (start, end),
                |row| row.get(0),
            )?,
        };

        Ok(count as u64)
    }

    /// Count the distinct user IDs in the database.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] there is some SQL error.
    fn count_unique_users(&self) -> Result<u64, Error> {
        let count: i64 = self.connection()?.query_row(
            "SELECT COUNT(DISTINCT user_id) FROM transactions",
            [],
            |row| row.get(0),
        )?;

        Ok(count as u64)
    }

    /// Retrieve the `limit` most recently created transactions.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] there is some SQL error.
    fn latest(&self, limit: u64) -> Result<Vec<Transaction>, Error> {
        self.connection()?
            .prepare(&format!(
                "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC LIMIT ?1"
            ))?
            .query_map([to_sql_integer(limit)], Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS transactions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL,
                    amount INTEGER NOT NULL,
                    status TEXT NOT NULL CHECK (status IN ('pending', 'success', 'failed')),
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                    )",
            (),
        )?;

        // Used by the dashboard and the latest transactions.
        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_transactions_created_at ON transactions(created_at);",
            (),
        )?;

        // Used by the filtered listing.
        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_transactions_status_user ON transactions(status, user_id);",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Transaction {
            id: row.get(offset)?,
            user_id: row.get(offset + 1)?,
            amount: row.get(offset + 2)?,
            status: row.get(offset + 3)?,
            created_at: row.get(offset + 4)?,
            updated_at: row.get(offset + 5)?,
        })
    }
}

#[cfg(test)]
mod sqlite_transaction_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime, UtcOffset};

    use crate::{
        Error,
        db::initialize,
        models::{NewTransaction, TransactionStatus},
        stores::{TransactionQuery, TransactionStore},
    };

    use super::SQLiteTransactionStore;

    fn get_store() -> SQLiteTransactionStore {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)))
    }

    /// Overwrite the creation time of transaction `id`.
    fn set_created_at(store: &SQLiteTransactionStore, id: i64, created_at: OffsetDateTime) {
        store
            .connection()
            .unwrap()
            .execute(
                "UPDATE transactions SET created_at = ?1, updated_at = ?1 WHERE id = ?2",
                (created_at, id),
            )
            .unwrap();
    }

    #[test]
    fn create_succeeds() {
        let store = get_store();

        let transaction = store
            .create(NewTransaction::new(123, 1000))
            .expect("Could not create transaction");

        assert_eq!(transaction.id, 1);
        assert_eq!(transaction.user_id, 123);
        assert_eq!(transaction.amount, 1000);
        assert_eq!(transaction.status, TransactionStatus::Pending);
        assert_eq!(transaction.created_at, transaction.updated_at);
    }

    #[test]
    fn create_assigns_unique_ids() {
        let store = get_store();

        let first = store.create(NewTransaction::new(1, 1)).unwrap();
        let second = store.create(NewTransaction::new(1, 1)).unwrap();

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn get_transaction_by_id_succeeds() {
        let store = get_store();
        let transaction = store
            .create(NewTransaction::new(7, -250).status(TransactionStatus::Failed))
            .unwrap();

        let selected_transaction = store.get(transaction.id);

        assert_eq!(Ok(transaction), selected_transaction);
    }

    #[test]
    fn get_transaction_fails_on_invalid_id() {
        let store = get_store();
        let transaction = store.create(NewTransaction::new(1, 123)).unwrap();

        let maybe_transaction = store.get(transaction.id + 654);

        assert_eq!(maybe_transaction, Err(Error::NotFound));
    }

    #[test]
    fn update_status_succeeds() {
        let store = get_store();
        let transaction = store.create(NewTransaction::new(123, 1000)).unwrap();

        let updated = store
            .update_status(transaction.id, TransactionStatus::Success)
            .expect("Could not update transaction");

        assert_eq!(updated.status, TransactionStatus::Success);
        assert_eq!(updated.created_at, transaction.created_at);
        assert!(
            updated.updated_at > updated.created_at,
            "want updated_at {} to be after created_at {}",
            updated.updated_at,
            updated.created_at
        );
        assert_eq!(store.get(transaction.id), Ok(updated));
    }

    #[test]
    fn update_status_fails_on_invalid_id() {
        let store = get_store();

        let result = store.update_status(42, TransactionStatus::Failed);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_succeeds() {
        let store = get_store();
        let transaction = store.create(NewTransaction::new(1, 1)).unwrap();

        store.delete(transaction.id).expect("Could not delete");

        assert_eq!(store.get(transaction.id), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_transaction_is_not_found_every_time() {
        let store = get_store();

        assert_eq!(store.delete(999), Err(Error::NotFound));
        assert_eq!(store.delete(999), Err(Error::NotFound));
    }

    #[test]
    fn get_query_paginates() {
        let store = get_store();
        let mut want = Vec::new();
        for i in 1..=25 {
            let transaction = store.create(NewTransaction::new(1, i)).unwrap();
            if (11..=20).contains(&i) {
                want.push(transaction);
            }
        }

        let got = store
            .get_query(TransactionQuery {
                page_number: 2,
                page_size: 10,
                ..Default::default()
            })
            .expect("Could not query store");

        assert_eq!(got.transactions, want);
        assert_eq!(got.total_record_count, 25);
    }

    #[test]
    fn get_query_past_last_page_is_empty() {
        let store = get_store();
        for i in 1..=3 {
            store.create(NewTransaction::new(1, i)).unwrap();
        }

        let got = store
            .get_query(TransactionQuery {
                page_number: 5,
                page_size: 10,
                ..Default::default()
            })
            .unwrap();

        assert!(got.transactions.is_empty());
        assert_eq!(got.total_record_count, 3);
    }

    #[test]
    fn get_query_filters_by_status_and_user() {
        let store = get_store();
        let statuses = [
            TransactionStatus::Pending,
            TransactionStatus::Success,
            TransactionStatus::Failed,
        ];
        for i in 0..30 {
            store
                .create(NewTransaction::new(i % 4, i).status(statuses[i as usize % 3]))
                .unwrap();
        }

        let query = TransactionQuery {
            page_number: 1,
            page_size: 2,
            status: Some(TransactionStatus::Success),
            user_id: Some(1),
        };
        let got = store.get_query(query.clone()).unwrap();

        // i % 4 == 1 and i % 3 == 1 => i in {1, 13, 25}
        assert_eq!(got.total_record_count, 3);
        assert_eq!(got.transactions.len(), 2);
        assert!(
            got.transactions.iter().all(|t| query.matches(t)),
            "got transactions that do not match the filters: {:?}",
            got.transactions
        );
    }

    #[test]
    fn get_query_supports_huge_page_size() {
        let store = get_store();
        for i in 1..=3 {
            store.create(NewTransaction::new(1, i)).unwrap();
        }

        let got = store
            .get_query(TransactionQuery {
                page_number: 1,
                page_size: u64::MAX,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(got.transactions.len(), 3);
    }

    #[test]
    fn count_by_status() {
        let store = get_store();
        for _ in 0..3 {
            store.create(NewTransaction::new(1, 1)).unwrap();
        }
        for _ in 0..2 {
            store
                .create(NewTransaction::new(1, 1).status(TransactionStatus::Failed))
                .unwrap();
        }

        assert_eq!(store.count_total(), Ok(5));
        assert_eq!(store.count(Some(TransactionStatus::Pending)), Ok(3));
        assert_eq!(store.count(Some(TransactionStatus::Failed)), Ok(2));
        assert_eq!(store.count(Some(TransactionStatus::Success)), Ok(0));
    }

    #[test]
    fn count_today_excludes_older_transactions() {
        let store = get_store();
        let yesterday = OffsetDateTime::now_utc() - Duration::days(1);
        let old = store
            .create(NewTransaction::new(1, 1).status(TransactionStatus::Success))
            .unwrap();
        set_created_at(&store, old.id, yesterday);
        store
            .create(NewTransaction::new(1, 1).status(TransactionStatus::Success))
            .unwrap();
        store.create(NewTransaction::new(2, 1)).unwrap();

        assert_eq!(store.count_today(None), Ok(2));
        assert_eq!(store.count_success_today(), Ok(1));
    }

    #[test]
    fn count_today_uses_local_offset() {
        let offset = UtcOffset::from_hms(13, 0, 0).unwrap();
        let store = get_store().with_local_offset(offset);
        let (start, end) = store.today();
        let inside = store.create(NewTransaction::new(1, 1)).unwrap();
        set_created_at(&store, inside.id, start);
        let before = store.create(NewTransaction::new(1, 1)).unwrap();
        set_created_at(&store, before.id, start - Duration::seconds(1));
        let after = store.create(NewTransaction::new(1, 1)).unwrap();
        set_created_at(&store, after.id, end);

        assert_eq!(start.to_offset(offset).time(), time::Time::MIDNIGHT);
        assert_eq!(store.count_today(None), Ok(1));
    }

    #[test]
    fn count_unique_users() {
        let store = get_store();
        for user_id in [1, 2, 2, 3, 3, 3] {
            store.create(NewTransaction::new(user_id, 1)).unwrap();
        }

        assert_eq!(store.count_unique_users(), Ok(3));
    }

    #[test]
    fn latest_returns_newest_first() {
        let store = get_store();
        let now = OffsetDateTime::now_utc();
        for i in 0..15 {
            let transaction = store.create(NewTransaction::new(1, i)).unwrap();
            // Oldest transaction gets the largest ID.
            set_created_at(&store, transaction.id, now - Duration::minutes(i));
        }

        let got = store.latest(10).unwrap();

        assert_eq!(got.len(), 10);
        let amounts: Vec<_> = got.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, (0..10).collect::<Vec<_>>());
    }
}
