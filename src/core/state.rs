//! Server State

use std::sync::Arc;

use crate::auth::{SessionStore, TokenService};
use crate::common::AppError;
use crate::core::Config;
use crate::db::DbService;
use crate::orders::OrderEngine;

/// Server state — holds shared references to every service
///
/// Each component receives the storage context through its constructor;
/// there is no ambient global database handle. `Clone` is a shallow copy.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Database service (SQLite pool)
    pub db: DbService,
    /// JWT token service
    pub tokens: Arc<TokenService>,
    /// Per-user session store
    pub sessions: SessionStore,
    /// Order reconciliation engine
    pub orders: OrderEngine,
}

impl ServerState {
    /// Initialize server state: open the database, then wire up services
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_path).await?;

        let tokens = Arc::new(TokenService::new(&config.tokens));
        let sessions = SessionStore::new(db.clone(), config.session_timeout_ms());
        let orders = OrderEngine::new(db.clone());

        Ok(Self {
            config: config.clone(),
            db,
            tokens,
            sessions,
            orders,
        })
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn orders(&self) -> &OrderEngine {
        &self.orders
    }
}
