//! Contains the [TransactionStore] trait and the objects that implement it.

mod memory;
mod transaction;

pub mod sqlite;

pub use memory::InMemoryTransactionStore;
pub use transaction::{TransactionPage, TransactionQuery, TransactionStore};
