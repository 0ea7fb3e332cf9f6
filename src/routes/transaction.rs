//! This files defines the routes for the transaction type.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::Response,
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    models::{DatabaseID, NewTransaction, Transaction, TransactionStatus},
    response::success,
    state::TransactionState,
    stores::{TransactionQuery, TransactionStore},
};

/// The raw query parameters for listing transactions.
///
/// Values are kept as strings so that malformed numbers can be ignored
/// instead of rejecting the request.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TransactionListParams {
    /// The 1-based page to fetch.
    pub page_number: Option<String>,
    /// The number of transactions per page.
    pub page_size: Option<String>,
    /// Only list transactions with this status, ignored if empty.
    pub status: Option<String>,
    /// Only list transactions for this user, ignored if empty, zero or not a number.
    pub user_id: Option<String>,
}

/// The payload of a transaction listing.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionListData {
    /// The page that was fetched.
    pub page_number: u64,
    /// The page size that was used.
    pub page_size: u64,
    /// The number of matching transactions across all pages.
    pub total_record_count: u64,
    /// The transactions on the page.
    pub data: Vec<Transaction>,
}

/// The body of a status update request.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    /// The new status, one of `pending`, `success` or `failed`.
    pub status: Option<String>,
}

fn parse_transaction_id(raw_id: &str) -> Result<DatabaseID, Error> {
    raw_id.parse().map_err(|_| Error::InvalidTransactionId)
}

/// A route handler for listing a page of transactions.
///
/// A status filter that is not a known status matches no transactions.
pub async fn get_transactions<T>(
    State(state): State<TransactionState<T>>,
    Query(params): Query<TransactionListParams>,
) -> Result<Response, Error>
where
    T: TransactionStore + Send + Sync,
{
    let page_number = state
        .pagination_config
        .page_number(params.page_number.as_deref());
    let page_size = state
        .pagination_config
        .page_size(params.page_size.as_deref());

    let status = match params.status.as_deref() {
        None | Some("") => None,
        Some(status) => match status.parse::<TransactionStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                tracing::debug!("No transactions can have the status {status:?}");
                return Ok(success(
                    "success get data",
                    TransactionListData {
                        page_number,
                        page_size,
                        total_record_count: 0,
                        data: Vec::new(),
                    },
                ));
            }
        },
    };

    let user_id = params
        .user_id
        .as_deref()
        .and_then(|user_id| user_id.parse().ok())
        .filter(|&user_id| user_id != 0);

    let page = state.transaction_store.get_query(TransactionQuery {
        page_number,
        page_size,
        status,
        user_id,
    })?;

    Ok(success(
        "success get data",
        TransactionListData {
            page_number,
            page_size,
            total_record_count: page.total_record_count,
            data: page.transactions,
        },
    ))
}

/// A route handler for getting a transaction by its database ID.
pub async fn get_transaction<T>(
    State(state): State<TransactionState<T>>,
    Path(transaction_id): Path<String>,
) -> Result<Response, Error>
where
    T: TransactionStore + Send + Sync,
{
    let transaction_id = parse_transaction_id(&transaction_id)?;

    let transaction = state.transaction_store.get(transaction_id)?;

    Ok(success("success get by id", transaction))
}

/// A route handler for creating a new transaction.
///
/// The body is parsed as JSON regardless of the content type header.
pub async fn create_transaction<T>(
    State(state): State<TransactionState<T>>,
    body: Bytes,
) -> Result<Response, Error>
where
    T: TransactionStore + Send + Sync,
{
    let new_transaction: NewTransaction =
        serde_json::from_slice(&body).map_err(|error| Error::InvalidJson(error.to_string()))?;

    let transaction = state.transaction_store.create(new_transaction)?;

    Ok(success("Success Create", transaction))
}

/// A route handler for changing the status of a transaction.
///
/// The ID, then the body and then the status value are validated before the
/// store is touched.
pub async fn update_transaction_status<T>(
    State(state): State<TransactionState<T>>,
    Path(transaction_id): Path<String>,
    body: Bytes,
) -> Result<Response, Error>
where
    T: TransactionStore + Send + Sync,
{
    let transaction_id = parse_transaction_id(&transaction_id)?;

    let status = serde_json::from_slice::<UpdateStatusRequest>(&body)
        .ok()
        .and_then(|request| request.status)
        .ok_or(Error::InvalidRequestBody)?
        .parse::<TransactionStatus>()?;

    let transaction = state
        .transaction_store
        .update_status(transaction_id, status)?;

    Ok(success("Success Update Transaction Status", transaction))
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction<T>(
    State(state): State<TransactionState<T>>,
    Path(transaction_id): Path<String>,
) -> Result<Response, Error>
where
    T: TransactionStore + Send + Sync,
{
    let transaction_id = parse_transaction_id(&transaction_id)?;

    state.transaction_store.delete(transaction_id)?;

    Ok(success("Success delete", ()))
}
