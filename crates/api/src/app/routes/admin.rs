//! Administrator routes: account directory, funding, bulk resets, audit log.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use corpcredit_auth::{require_role, Role};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/admin/wallet", post(fund_wallet))
        .route("/admin/wallet/reset", post(reset_wallet))
        .route("/admin/transactions", get(list_all_transactions))
}

pub async fn list_accounts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    if let Err(e) = require_role(actor.claims(), Role::Admin) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.engine.accounts().await {
        Ok(accounts) => (StatusCode::OK, Json(accounts)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn create_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::CreateAccountRequest>,
) -> axum::response::Response {
    if let Err(e) = require_role(actor.claims(), Role::Admin) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    if body.username.trim().is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation", "username must not be empty");
    }

    match services
        .engine
        .create_account(actor.role(), body.username.trim(), body.role)
        .await
    {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn fund_wallet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::FundWalletRequest>,
) -> axum::response::Response {
    if let Err(e) = require_role(actor.claims(), Role::Admin) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services
        .engine
        .fund_account(actor.role(), body.account_id, body.amount)
        .await
    {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn reset_wallet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::ResetWalletRequest>,
) -> axum::response::Response {
    if let Err(e) = require_role(actor.claims(), Role::Admin) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match (body.account_id, body.role) {
        (Some(account_id), None) => {
            match services
                .engine
                .reset_balance(actor.role(), account_id, body.balance)
                .await
            {
                Ok(account) => (StatusCode::OK, Json(account)).into_response(),
                Err(e) => errors::ledger_error_to_response(e),
            }
        }
        (None, Some(role)) => {
            match services
                .engine
                .reset_balances_for_role(actor.role(), role, body.balance)
                .await
            {
                Ok(count) => {
                    (StatusCode::OK, Json(serde_json::json!({ "updated": count }))).into_response()
                }
                Err(e) => errors::ledger_error_to_response(e),
            }
        }
        _ => errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation",
            "provide exactly one of account_id or role",
        ),
    }
}

pub async fn list_all_transactions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<dto::TransactionWindowQuery>,
) -> axum::response::Response {
    if let Err(e) = require_role(actor.claims(), Role::Admin) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.engine.all_transactions(query.time_range()).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
