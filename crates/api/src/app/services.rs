//! Service wiring: store selection, engine, and notification dispatcher.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use corpcredit_auth::Hs256TokenCodec;
use corpcredit_infra::{InMemoryLedgerStore, PostgresLedgerStore};
use corpcredit_ledger::{LedgerEngine, LedgerStore};
use corpcredit_notify::NotificationDispatcher;

/// Shared per-process services, injected into handlers via `Extension`.
pub struct AppServices {
    pub engine: Arc<LedgerEngine>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub codec: Arc<Hs256TokenCodec>,
}

impl AppServices {
    pub fn new(store: Arc<dyn LedgerStore>, codec: Arc<Hs256TokenCodec>) -> Self {
        let dispatcher = Arc::new(NotificationDispatcher::new());
        let engine = Arc::new(LedgerEngine::new(store, dispatcher.clone()));
        Self {
            engine,
            dispatcher,
            codec,
        }
    }
}

/// Pick the store backend from the environment.
///
/// `DATABASE_URL` set ⇒ Postgres (schema ensured on startup); otherwise the
/// in-memory store, which loses state on restart and is meant for dev.
pub async fn store_from_env() -> anyhow::Result<Arc<dyn LedgerStore>> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = PgPoolOptions::new().max_connections(10).connect(&url).await?;
            let store = PostgresLedgerStore::new(pool);
            store
                .migrate()
                .await
                .map_err(|e| anyhow::anyhow!("schema migration failed: {e}"))?;
            tracing::info!("using postgres ledger store");
            Ok(Arc::new(store))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using volatile in-memory ledger store");
            Ok(Arc::new(InMemoryLedgerStore::new()))
        }
    }
}
