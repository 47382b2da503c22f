//! Vendor routes: received-payment history (earnings are derived from it).

use std::sync::Arc;

use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};

use corpcredit_auth::{require_role, Role};
use corpcredit_ledger::TransactionParty;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new().route("/vendor/transactions", get(received_transactions))
}

pub async fn received_transactions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    if let Err(e) = require_role(actor.claims(), Role::Vendor) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services
        .engine
        .transactions_for_account(actor.account_id(), TransactionParty::Payee)
        .await
    {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
