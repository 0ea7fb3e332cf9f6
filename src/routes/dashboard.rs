//! The route handlers for the dashboard views.

use axum::{extract::State, http::StatusCode, response::Response};

use crate::{
    ApiResponse,
    response::{render, success},
    state::DashboardState,
    stores::TransactionStore,
};

/// A route handler for the transaction summary.
///
/// Store errors are logged and reported to the client as a generic 500.
pub async fn get_dashboard_summary<T>(State(state): State<DashboardState<T>>) -> Response
where
    T: TransactionStore + Send + Sync,
{
    match state.dashboard.summary() {
        Ok(summary) => success("Success get summary", summary),
        Err(error) => {
            tracing::error!("Could not compute the dashboard summary: {error}");
            render(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::error("Failed to fetch summary data"),
            )
        }
    }
}

/// A route handler for the dashboard report.
///
/// Store errors are logged and reported to the client as a generic 500.
pub async fn get_dashboard_report<T>(State(state): State<DashboardState<T>>) -> Response
where
    T: TransactionStore + Send + Sync,
{
    match state.dashboard.report() {
        Ok(report) => success("Success get report", report),
        Err(error) => {
            tracing::error!("Could not compute the dashboard report: {error}");
            render(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::error("Failed to fetch report data"),
            )
        }
    }
}

#[cfg(test)]
mod dashboard_route_tests {
    use axum::{extract::State, http::StatusCode};
    use axum_test::TestServer;
    use serde_json::Value;

    use crate::{
        ApiResponse, AppState, Dashboard, DashboardReport, PaginationConfig, ResponseStatus,
        TransactionSummary, build_router, endpoints,
        models::{NewTransaction, TransactionStatus},
        state::DashboardState,
        stores::{InMemoryTransactionStore, TransactionStore},
    };

    use super::get_dashboard_summary;

    fn get_test_server(store: InMemoryTransactionStore) -> TestServer {
        let app = build_router(AppState::new(store, PaginationConfig::default()));

        TestServer::new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn summary_over_three_users() {
        let store = InMemoryTransactionStore::new();
        for i in 0..12 {
            store
                .create(NewTransaction::new(i % 3 + 1, 100).status(TransactionStatus::Success))
                .unwrap();
        }
        let server = get_test_server(store);

        let response = server.get(endpoints::DASHBOARD_SUMMARY).await;

        response.assert_status_ok();
        let body = response.json::<ApiResponse<TransactionSummary>>();
        assert_eq!(body.status, ResponseStatus::Success);
        assert_eq!(body.message, "Success get summary");
        let summary = body.data.unwrap();
        assert_eq!(summary.total_transactions, 12);
        assert_eq!(summary.unique_users, 3);
        assert_eq!(summary.average_transaction_per_user, 4.0);
        assert_eq!(summary.total_success_transactions, 12);
    }

    #[tokio::test]
    async fn report_on_empty_store() {
        let server = get_test_server(InMemoryTransactionStore::new());

        let response = server.get(endpoints::DASHBOARD_REPORT).await;

        response.assert_status_ok();
        let body = response.json::<ApiResponse<DashboardReport>>();
        assert_eq!(body.message, "Success get report");
        assert_eq!(
            body.data,
            Some(DashboardReport {
                total_success_today: 0,
                average_transaction_per_user: 0.0,
                latest_transactions: vec![],
            })
        );
    }

    #[tokio::test]
    async fn summary_failure_hides_cause() {
        let store = InMemoryTransactionStore::new();
        store.poison();
        let state = DashboardState {
            dashboard: Dashboard::new(store),
        };

        let response = get_dashboard_summary(State(state)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ApiResponse<Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.status, ResponseStatus::Error);
        assert_eq!(body.message, "Failed to fetch summary data");
    }

    #[tokio::test]
    async fn report_failure_hides_cause() {
        let store = InMemoryTransactionStore::new();
        store.poison();
        let server = get_test_server(store);

        let response = server.get(endpoints::DASHBOARD_REPORT).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.json::<ApiResponse<Value>>();
        assert_eq!(body.message, "Failed to fetch report data");
        assert_eq!(body.data, None);
    }
}
