use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use corpcredit_core::LedgerError;

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        // Business-rule rejection, not a server fault.
        LedgerError::InsufficientBalance => json_error(
            StatusCode::BAD_REQUEST,
            "insufficient_balance",
            "insufficient balance",
        ),
        LedgerError::InvalidAmount(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_amount", msg)
        }
        LedgerError::Unauthorized => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
        LedgerError::UsernameTaken => {
            json_error(StatusCode::CONFLICT, "username_taken", "username already taken")
        }
        LedgerError::SettlementFailure(msg) => {
            // Ledger inconsistency; surfaced distinctly for operator reconciliation.
            tracing::error!(error = %msg, "settlement failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "settlement_failure", msg)
        }
        LedgerError::DuplicateTransactionId | LedgerError::Storage(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "storage_error",
            err.to_string(),
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
