use crate::auth::TokenService;
use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::gate::RequestGate;

/// Shared application state, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub gate: RequestGate,
    pub page_size: u32,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self> {
        let db = Database::open(&config.db_path).await?;
        Ok(Self::with_database(config, &db))
    }

    pub fn with_database(config: &Config, db: &Database) -> Self {
        Self {
            gate: RequestGate::new(TokenService::from_config(config), db),
            page_size: config.page_size,
        }
    }
}
