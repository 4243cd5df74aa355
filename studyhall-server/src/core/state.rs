use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::storage::ItemStorage;

/// Server state - shared handles for every handler
///
/// Cloning is cheap: every field is either `Arc`-backed or small.
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | config | Config | immutable configuration |
/// | storage | ItemStorage | redb store for scopes and items |
/// | jwt_service | Arc<JwtService> | token validation |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub storage: ItemStorage,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    pub fn new(config: Config, storage: ItemStorage, jwt_service: Arc<JwtService>) -> Self {
        Self {
            config,
            storage,
            jwt_service,
        }
    }

    /// Open the database under `work_dir` and build the JWT service
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let db_path = config.db_path();
        let storage = ItemStorage::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Item storage opened");

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self::new(config.clone(), storage, jwt_service))
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
