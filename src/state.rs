use std::sync::Arc;

use mongodb::{Client, Database};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    /// Kept alongside `db` because team-membership writes open a client
    /// session for the multi-document transaction.
    pub client: Client,
    pub db: Database,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(client: Client, config: AppConfig) -> Self {
        let db = client.database(&config.database_name);
        AppState {
            client,
            db,
            config: Arc::new(config),
        }
    }
}
