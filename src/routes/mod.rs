//! The route handlers for the REST API.

mod dashboard;
mod transaction;

pub use dashboard::{get_dashboard_report, get_dashboard_summary};
pub use transaction::{
    TransactionListData, TransactionListParams, UpdateStatusRequest, create_transaction,
    delete_transaction, get_transaction, get_transactions, update_transaction_status,
};
