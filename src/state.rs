//! Implements a struct that holds the state of the REST server.

use axum::extract::FromRef;

use crate::{dashboard::Dashboard, pagination::PaginationConfig, stores::TransactionStore};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState<T>
where
    T: TransactionStore + Send + Sync,
{
    /// The store for managing [transactions](crate::models::Transaction).
    pub transaction_store: T,
    /// The config that controls how to page transaction listings.
    pub pagination_config: PaginationConfig,
}

impl<T> AppState<T>
where
    T: TransactionStore + Send + Sync,
{
    /// Create a new [AppState].
    pub fn new(transaction_store: T, pagination_config: PaginationConfig) -> Self {
        Self {
            transaction_store,
            pagination_config,
        }
    }
}

/// The state needed to list, get, create, update and delete transactions.
#[derive(Debug, Clone)]
pub struct TransactionState<T>
where
    T: TransactionStore + Send + Sync,
{
    /// The store for managing [transactions](crate::models::Transaction).
    pub transaction_store: T,
    /// The config that controls how to page transaction listings.
    pub pagination_config: PaginationConfig,
}

impl<T> FromRef<AppState<T>> for TransactionState<T>
where
    T: TransactionStore + Clone + Send + Sync,
{
    fn from_ref(state: &AppState<T>) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The state needed for the dashboard endpoints.
#[derive(Debug, Clone)]
pub struct DashboardState<T>
where
    T: TransactionStore + Send + Sync,
{
    /// Computes the aggregate views.
    pub dashboard: Dashboard<T>,
}

impl<T> FromRef<AppState<T>> for DashboardState<T>
where
    T: TransactionStore + Clone + Send + Sync,
{
    fn from_ref(state: &AppState<T>) -> Self {
        Self {
            dashboard: Dashboard::new(state.transaction_store.clone()),
        }
    }
}
