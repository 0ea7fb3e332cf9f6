//! Application router configuration.

use axum::{
    Json, Router,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::{
    AppState, endpoints,
    not_found::get_404_not_found,
    routes::{
        create_transaction, delete_transaction, get_dashboard_report, get_dashboard_summary,
        get_transaction, get_transactions, update_transaction_status,
    },
    stores::TransactionStore,
};

/// Return a router with all the app's routes.
pub fn build_router<T>(state: AppState<T>) -> Router
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions::<T>).post(create_transaction::<T>),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction::<T>)
                .put(update_transaction_status::<T>)
                .delete(delete_transaction::<T>),
        )
        .route(
            endpoints::DASHBOARD_SUMMARY,
            get(get_dashboard_summary::<T>),
        )
        .route(endpoints::DASHBOARD_REPORT, get(get_dashboard_report::<T>))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The liveness probe, always answers `{"live": "ok"}`.
async fn get_health() -> Response {
    Json(json!({"live": "ok"})).into_response()
}
