//! This module defines the domain data types.

pub use transaction::{NewTransaction, Transaction, TransactionStatus};

mod transaction;

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;

/// Alias for the integer type used for the owner of a transaction.
pub type UserID = i64;
