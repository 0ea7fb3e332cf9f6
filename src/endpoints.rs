//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/transaction/{id}', use [format_endpoint].

/// The liveness probe.
pub const HEALTH: &str = "/health";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/transaction";
/// The route to get, update and delete a single transaction.
pub const TRANSACTION: &str = "/transaction/{id}";
/// The route for the dashboard summary.
pub const DASHBOARD_SUMMARY: &str = "/dashboard/summary";
/// The route for the dashboard report.
pub const DASHBOARD_REPORT: &str = "/dashboard/report";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// Assumes `endpoint_path` contains exactly one parameter in braces.
pub fn format_endpoint(endpoint_path: &str, id: impl std::fmt::Display) -> String {
    match (endpoint_path.find('{'), endpoint_path.find('}')) {
        (Some(start), Some(end)) if start < end => format!(
            "{}{id}{}",
            &endpoint_path[..start],
            &endpoint_path[end + 1..]
        ),
        _ => endpoint_path.to_owned(),
    }
}
