use std::{fs::File, io::Read, path::Path};

use sqlx::SqlitePool;
use tracing::{info, warn};

use super::bulk_load;
use crate::error::DataError;
use crate::records::model::{Claim, Entity, FoodListing, Provider, Receiver};

/// Rows written per table by [`seed_from_dir`]; `None` when its file was absent.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub providers: Option<u64>,
    pub receivers: Option<u64>,
    pub food_listings: Option<u64>,
    pub claims: Option<u64>,
}

/// Loads the four initial CSV sources found in `dir`, one table each.
pub async fn seed_from_dir(pool: &SqlitePool, dir: &Path) -> Result<SeedSummary, DataError> {
    Ok(SeedSummary {
        providers: load_file::<Provider>(pool, dir).await?,
        receivers: load_file::<Receiver>(pool, dir).await?,
        food_listings: load_file::<FoodListing>(pool, dir).await?,
        claims: load_file::<Claim>(pool, dir).await?,
    })
}

/// Initial load of a newly created store at `db_path`.
///
/// A failed load closes the pool and removes the file, so the next start
/// sees a fresh store and seeds again.
pub async fn seed_fresh(
    pool: &SqlitePool,
    db_path: &Path,
    dir: &Path,
) -> Result<SeedSummary, DataError> {
    match seed_from_dir(pool, dir).await {
        Ok(summary) => Ok(summary),
        Err(e) => {
            warn!(path = %db_path.display(), error = %e, "initial load failed; discarding store");
            pool.close().await;
            tokio::fs::remove_file(db_path).await?;
            Err(e)
        }
    }
}

async fn load_file<E: Entity>(pool: &SqlitePool, dir: &Path) -> Result<Option<u64>, DataError> {
    let table = E::KIND.table();
    let path = dir.join(E::KIND.seed_file());
    if !path.exists() {
        warn!(path = %path.display(), table, "seed file missing; table left empty");
        return Ok(None);
    }

    let rows = read_csv::<E, _>(File::open(&path)?)?;
    let loaded = bulk_load(pool, rows).await?;
    info!(path = %path.display(), table, rows = loaded, "seed file loaded");
    Ok(Some(loaded))
}

pub(crate) fn read_csv<E: Entity, R: Read>(reader: R) -> Result<Vec<E>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let rows = rdr.deserialize().collect::<Result<Vec<E>, _>>()?;
    Ok(rows)
}
