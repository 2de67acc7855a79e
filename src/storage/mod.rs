//! The single-file SQLite store holding Providers, Receivers, FoodListings
//! and Claims.

use std::path::Path;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::{debug, info};

use crate::error::DataError;
use crate::records::{model::Entity, repo::insert_sql};

pub mod seed;

pub struct Store {
    pub pool: SqlitePool,
    /// The database file did not exist before `open` created it.
    pub fresh: bool,
}

pub async fn open(path: &Path, max_connections: u32) -> Result<Store, DataError> {
    let fresh = !path.exists();
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    info!(path = %path.display(), fresh, "store opened");
    Ok(Store { pool, fresh })
}

/// Creates the four tables and the join-column indexes when absent.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), DataError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    debug!("schema ensured");
    Ok(())
}

/// Replaces the whole contents of `E`'s table with `rows`.
///
/// Runs in one transaction: on failure the previous contents stay in place.
pub async fn bulk_load<E: Entity>(pool: &SqlitePool, rows: Vec<E>) -> Result<u64, DataError> {
    let table = E::KIND.table();
    let mut tx = pool.begin().await?;

    let removed = sqlx::query(&format!("DELETE FROM {table}"))
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let sql = insert_sql::<E>();
    let mut inserted = 0;
    for row in &rows {
        inserted += row
            .bind_columns(sqlx::query(&sql).bind(row.id()))
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }
    tx.commit().await?;

    debug!(table, removed, inserted, "bulk load committed");
    Ok(inserted)
}

#[cfg(test)]
pub(crate) async fn test_pool() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open(&dir.path().join("food.db"), 2)
        .await
        .expect("open store");
    ensure_schema(&store.pool).await.expect("ensure schema");
    (dir, store.pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{
        model::{FoodListing, Provider},
        repo,
    };

    fn provider(id: i64, name: &str, city: &str) -> Provider {
        Provider {
            provider_id: Some(id),
            name: Some(name.into()),
            kind: Some("Grocery".into()),
            address: Some("addr".into()),
            city: Some(city.into()),
            contact: Some("c1".into()),
        }
    }

    #[tokio::test]
    async fn open_reports_fresh_only_for_new_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("food.db");

        let first = open(&path, 1).await.unwrap();
        assert!(first.fresh);
        ensure_schema(&first.pool).await.unwrap();
        first.pool.close().await;

        let second = open(&path, 1).await.unwrap();
        assert!(!second.fresh);
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let (_dir, pool) = test_pool().await;
        ensure_schema(&pool).await.expect("second run is a no-op");
        ensure_schema(&pool).await.expect("third run is a no-op");
        let providers: Vec<Provider> = repo::list(&pool).await.unwrap();
        assert!(providers.is_empty());
    }

    #[tokio::test]
    async fn bulk_load_replaces_table_contents() {
        let (_dir, pool) = test_pool().await;

        let n = bulk_load(&pool, vec![provider(1, "A", "CityX"), provider(2, "B", "CityY")])
            .await
            .unwrap();
        assert_eq!(n, 2);

        let n = bulk_load(&pool, vec![provider(3, "C", "CityZ")]).await.unwrap();
        assert_eq!(n, 1);

        let rows: Vec<Provider> = repo::list(&pool).await.unwrap();
        assert_eq!(rows, vec![provider(3, "C", "CityZ")]);
    }

    #[tokio::test]
    async fn bulk_load_failure_keeps_previous_rows() {
        let (_dir, pool) = test_pool().await;
        bulk_load(&pool, vec![provider(1, "A", "CityX")]).await.unwrap();

        let err = bulk_load(&pool, vec![provider(5, "E", "X"), provider(5, "F", "Y")])
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Database(_)));

        let rows: Vec<Provider> = repo::list(&pool).await.unwrap();
        assert_eq!(rows, vec![provider(1, "A", "CityX")]);
    }

    #[tokio::test]
    async fn bulk_load_only_touches_its_own_table() {
        let (_dir, pool) = test_pool().await;
        bulk_load(&pool, vec![provider(1, "A", "CityX")]).await.unwrap();
        bulk_load::<FoodListing>(&pool, Vec::new()).await.unwrap();

        let rows: Vec<Provider> = repo::list(&pool).await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
