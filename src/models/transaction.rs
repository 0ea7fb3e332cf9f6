//! Defines [Transaction], the record at the core of the ledger, and its
//! lifecycle state [TransactionStatus].

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    models::{DatabaseID, UserID},
};

/// The lifecycle state of a [Transaction].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// The transaction has been recorded but not settled.
    #[default]
    Pending,
    /// The transaction settled successfully.
    Success,
    /// The transaction did not go through.
    Failed,
}

impl TransactionStatus {
    /// The lowercase name used in JSON and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Success => "success",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    /// Parse a status, accepting exactly `pending`, `success` or `failed`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidStatus] for any other string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "success" => Ok(TransactionStatus::Success),
            "failed" => Ok(TransactionStatus::Failed),
            _ => Err(Error::InvalidStatus),
        }
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// A financial transaction made by a user.
///
/// Transactions are only ever created through a
/// [TransactionStore](crate::stores::TransactionStore), which assigns the ID
/// and the timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseID,
    /// The ID of the user that owns the transaction.
    pub user_id: UserID,
    /// The amount of money in the currency's minor unit, e.g. cents.
    pub amount: i64,
    /// Where the transaction is in its lifecycle.
    pub status: TransactionStatus,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The client supplied fields of a transaction.
///
/// Any `id`, `created_at` or `updated_at` fields in a request body are ignored,
/// the store sets these itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// The ID of the user that owns the transaction.
    pub user_id: UserID,
    /// The amount of money in the currency's minor unit.
    pub amount: i64,
    /// The initial status, `pending` if not given.
    #[serde(default)]
    pub status: TransactionStatus,
}

impl NewTransaction {
    /// Create a pending transaction for `user_id`.
    pub fn new(user_id: UserID, amount: i64) -> Self {
        Self {
            user_id,
            amount,
            status: TransactionStatus::Pending,
        }
    }

    /// Set the initial status of the transaction.
    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }
}
