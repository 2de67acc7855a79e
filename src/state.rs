use std::sync::Arc;

use anyhow::Context;
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::storage::{self, seed};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Opens the store, ensures the schema and, for a newly created file only,
    /// runs the initial CSV load.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = storage::open(&config.database_path, config.max_connections)
            .await
            .context("open database")?;
        storage::ensure_schema(&store.pool)
            .await
            .context("ensure schema")?;

        if store.fresh {
            let summary = seed::seed_fresh(&store.pool, &config.database_path, &config.seed_dir)
                .await
                .with_context(|| format!("seed from {}", config.seed_dir.display()))?;
            tracing::info!(?summary, "initial load finished");
        }

        Ok(Self::from_parts(store.pool, config))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    #[cfg(test)]
    pub fn for_pool(db: SqlitePool) -> Self {
        let config = Arc::new(AppConfig {
            database_path: "test.db".into(),
            seed_dir: "data".into(),
            max_connections: 2,
        });
        Self::from_parts(db, config)
    }
}
