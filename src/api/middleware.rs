//! API Middleware
//!
//! Request logging for the ledger routes.

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};

/// Account number addressed by a `/accounts/:account_id/...` path, if any
fn account_in_path(path: &str) -> Option<&str> {
    let mut segments = path.split('/').skip_while(|s| *s != "accounts");
    segments.next()?;
    segments.next().filter(|id| !id.is_empty())
}

/// Log each request with the account it touches and how it ended.
///
/// Client errors are warnings (overdrafts, unknown accounts); server
/// errors are errors.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let account_id = account_in_path(&path).unwrap_or("-").to_string();

    let start = Instant::now();
    tracing::debug!(method = %method, path = %path, account_id = %account_id, "Ledger request");

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            account_id = %account_id,
            status = status.as_u16(),
            duration_ms,
            "Ledger request failed"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            account_id = %account_id,
            status = status.as_u16(),
            duration_ms,
            "Ledger request rejected"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            account_id = %account_id,
            status = status.as_u16(),
            duration_ms,
            "Ledger request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_in_path() {
        assert_eq!(account_in_path("/accounts/1234567890/debit"), Some("1234567890"));
        assert_eq!(account_in_path("/api/v1/accounts/42"), Some("42"));
        assert_eq!(account_in_path("/accounts"), None);
        assert_eq!(account_in_path("/accounts/"), None);
        assert_eq!(account_in_path("/transfers"), None);
    }
}
