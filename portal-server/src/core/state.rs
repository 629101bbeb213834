//! Shared server state

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::notify::ChangeNotifier;
use crate::payments::{verifier, HttpPaymentGateway, PaymentGateway};
use crate::utils::AppResult;

/// Everything handlers need, cheap to clone.
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub notifier: ChangeNotifier,
    pub gateway: Arc<dyn PaymentGateway>,
}

impl ServerState {
    pub async fn initialize(config: Config) -> AppResult<Self> {
        let db = DbService::new(&config.database_path).await?;
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let gateway = Arc::new(HttpPaymentGateway::new(config.gateway.clone())?);

        Ok(Self {
            config: Arc::new(config),
            pool: db.pool,
            jwt_service,
            notifier: ChangeNotifier::new(),
            gateway,
        })
    }

    /// Background loops that outlive individual requests. Currently one:
    /// the settlement reconciliation pass.
    pub fn start_background_tasks(&self) {
        let interval_secs = self.config.reconcile_interval_secs;
        if interval_secs == 0 {
            tracing::info!("Reconciliation loop disabled");
            return;
        }

        let pool = self.pool.clone();
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(std::time::Duration::from_secs(interval_secs));
            loop {
                ticker.tick().await;
                match verifier::reconcile(&pool, &notifier).await {
                    Ok(0) => {}
                    Ok(repaired) => {
                        tracing::info!(repaired, "Reconciliation pass repaired settlements");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Reconciliation pass failed");
                    }
                }
            }
        });
    }
}
