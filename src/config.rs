use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub seed_dir: PathBuf,
    pub max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "food.db".into());
        let seed_dir = std::env::var("SEED_DIR").unwrap_or_else(|_| "data".into());
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(5);
        Ok(Self {
            database_path: database_path.into(),
            seed_dir: seed_dir.into(),
            max_connections,
        })
    }
}
