//! Application state and initialization
//!
//! Opens the database under the configured data directory and wires the
//! services together. Everything a front end needs is reachable from `AppState`.

use crate::config::AppConfig;
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::services::{CatalogService, PlanService};
use sqlx::SqlitePool;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub catalog: CatalogService,
    pub plans: PlanService,
}

impl AppState {
    /// Open (or create) the database and build the services
    pub async fn init(config: AppConfig) -> Result<Self> {
        tracing::info!("Initializing application");
        tracing::info!("Data directory: {:?}", config.data_dir);

        let pool = create_pool(&config.database_path()).await?;
        let state = Self::from_pool(pool, config);

        tracing::info!("Application initialized successfully");
        Ok(state)
    }

    /// Build the services on top of an already initialized pool
    pub fn from_pool(pool: SqlitePool, config: AppConfig) -> Self {
        let repo = Repository::new(pool);

        Self {
            config,
            catalog: CatalogService::new(repo.clone()),
            plans: PlanService::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DATABASE_FILE_NAME;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_database_in_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("nested").join("data");

        let state = AppState::init(AppConfig::new(&data_dir)).await.unwrap();
        state.catalog.create_diet("Diet").await.unwrap();

        assert!(data_dir.join(DATABASE_FILE_NAME).exists());
        assert_eq!(state.catalog.list_diets().await.unwrap().len(), 1);
    }
}
