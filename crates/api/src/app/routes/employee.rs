//! Employee routes: vendor directory, payments, own history.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use corpcredit_auth::{require_role, Role};
use corpcredit_ledger::TransactionParty;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/vendors", get(list_vendors))
        .route("/employee/pay", post(pay))
        .route("/employee/transactions", get(own_transactions))
}

/// Vendor directory; open to every authenticated role.
pub async fn list_vendors(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.engine.vendors().await {
        Ok(vendors) => (StatusCode::OK, Json(vendors)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn pay(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::PayRequest>,
) -> axum::response::Response {
    if let Err(e) = require_role(actor.claims(), Role::Employee) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services
        .engine
        .pay(actor.role(), actor.account_id(), body.vendor_id, body.amount)
        .await
    {
        Ok(transaction) => (StatusCode::OK, Json(transaction)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn own_transactions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    if let Err(e) = require_role(actor.claims(), Role::Employee) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services
        .engine
        .transactions_for_account(actor.account_id(), TransactionParty::Payer)
        .await
    {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
