use serde::Serialize;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::model::{ClaimStatus, Entity, EntityKind, WriteMode};
use crate::error::DataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub id: i64,
    pub rows_affected: u64,
}

fn select_sql<E: Entity>() -> String {
    format!(
        "SELECT {}, {} FROM {}",
        E::KIND.id_column(),
        E::COLUMNS.join(", "),
        E::KIND.table()
    )
}

/// `INSERT` of the identity followed by every data column, all bound.
pub(crate) fn insert_sql<E: Entity>() -> String {
    let placeholders = vec!["?"; E::COLUMNS.len() + 1].join(", ");
    format!(
        "INSERT INTO {} ({}, {}) VALUES ({})",
        E::KIND.table(),
        E::KIND.id_column(),
        E::COLUMNS.join(", "),
        placeholders
    )
}

fn upsert_sql<E: Entity>() -> String {
    let assignments = E::COLUMNS
        .iter()
        .map(|c| format!("{c} = excluded.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{} ON CONFLICT({}) DO UPDATE SET {}",
        insert_sql::<E>(),
        E::KIND.id_column(),
        assignments
    )
}

fn replace_sql<E: Entity>() -> String {
    let assignments = E::COLUMNS
        .iter()
        .map(|c| format!("{c} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {} WHERE {} = ?",
        E::KIND.table(),
        assignments,
        E::KIND.id_column()
    )
}

/// Every row of `E`'s table, by identity.
pub async fn list<E: Entity>(db: &SqlitePool) -> Result<Vec<E>, DataError> {
    let sql = format!("{} ORDER BY {}", select_sql::<E>(), E::KIND.id_column());
    let rows = sqlx::query_as::<_, E>(&sql).fetch_all(db).await?;
    Ok(rows)
}

pub async fn get<E: Entity>(db: &SqlitePool, id: i64) -> Result<Option<E>, DataError> {
    let sql = format!("{} WHERE {} = ?", select_sql::<E>(), E::KIND.id_column());
    let row = sqlx::query_as::<_, E>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Writes one full row.
///
/// Zero identities count as absent and let the store assign one. `Replace`
/// needs an identity and reports `rows_affected == 0` when no row has it.
pub async fn write<E: Entity>(
    db: &SqlitePool,
    record: E,
    mode: WriteMode,
) -> Result<WriteOutcome, DataError> {
    let record = record.normalize();
    record.validate()?;
    let table = E::KIND.table();
    let id_column = E::KIND.id_column();

    let outcome = match mode {
        WriteMode::Insert | WriteMode::Upsert => {
            let base = match mode {
                WriteMode::Insert => insert_sql::<E>(),
                _ => upsert_sql::<E>(),
            };
            let sql = format!("{base} RETURNING {id_column}");
            let row = record
                .bind_columns(sqlx::query(&sql).bind(record.id()))
                .fetch_one(db)
                .await
                .map_err(|e| conflict_or_db::<E>(e, record.id()))?;
            WriteOutcome {
                id: row.try_get(0)?,
                rows_affected: 1,
            }
        }
        WriteMode::Replace => {
            let id = record.id().ok_or_else(|| {
                DataError::validation(format!("replace on {table} requires {id_column}"))
            })?;
            let sql = replace_sql::<E>();
            let res = record
                .bind_columns(sqlx::query(&sql))
                .bind(id)
                .execute(db)
                .await?;
            WriteOutcome {
                id,
                rows_affected: res.rows_affected(),
            }
        }
    };

    debug!(table, ?mode, id = outcome.id, rows = outcome.rows_affected, "row written");
    Ok(outcome)
}

fn conflict_or_db<E: Entity>(e: sqlx::Error, id: Option<i64>) -> DataError {
    match (&e, id) {
        (sqlx::Error::Database(db_err), Some(id)) if db_err.is_unique_violation() => {
            DataError::Conflict {
                table: E::KIND.table(),
                column: E::KIND.id_column(),
                id,
            }
        }
        _ => DataError::Database(e),
    }
}

pub async fn update_quantity(
    db: &SqlitePool,
    food_id: i64,
    quantity: i64,
) -> Result<u64, DataError> {
    let res = sqlx::query("UPDATE FoodListings SET Quantity = ? WHERE Food_ID = ?")
        .bind(quantity)
        .bind(food_id)
        .execute(db)
        .await?;
    debug!(food_id, quantity, rows = res.rows_affected(), "quantity updated");
    Ok(res.rows_affected())
}

pub async fn update_claim_status(
    db: &SqlitePool,
    claim_id: i64,
    status: ClaimStatus,
) -> Result<u64, DataError> {
    let res = sqlx::query("UPDATE Claims SET Status = ? WHERE Claim_ID = ?")
        .bind(status.as_str())
        .bind(claim_id)
        .execute(db)
        .await?;
    debug!(claim_id, %status, rows = res.rows_affected(), "claim status updated");
    Ok(res.rows_affected())
}

/// Removes the row with identity `id`. References to it elsewhere are left as they are.
pub async fn delete(db: &SqlitePool, kind: EntityKind, id: i64) -> Result<u64, DataError> {
    let sql = format!("DELETE FROM {} WHERE {} = ?", kind.table(), kind.id_column());
    let res = sqlx::query(&sql).bind(id).execute(db).await?;
    debug!(table = kind.table(), id, rows = res.rows_affected(), "row deleted");
    Ok(res.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::model::{Claim, FoodListing, Provider, Receiver};
    use crate::storage::test_pool;

    fn bread(id: Option<i64>) -> FoodListing {
        FoodListing {
            food_id: id,
            food_name: Some("Bread".into()),
            quantity: Some(5),
            expiry_date: Some("2024-01-01".into()),
            provider_id: Some(1),
            provider_type: Some("Grocery".into()),
            location: Some("CityX".into()),
            food_type: Some("Bakery".into()),
            meal_type: Some("Breakfast".into()),
        }
    }

    fn claim(id: i64, status: &str) -> Claim {
        Claim {
            claim_id: Some(id),
            food_id: Some(10),
            receiver_id: Some(1),
            status: Some(status.into()),
            timestamp: Some("2024-01-02 10:00:00".into()),
        }
    }

    #[test]
    fn builds_statements_from_column_lists() {
        assert_eq!(
            insert_sql::<Receiver>(),
            "INSERT INTO Receivers (Receiver_ID, Name, Type, City, Contact) VALUES (?, ?, ?, ?, ?)"
        );
        assert_eq!(
            replace_sql::<Claim>(),
            "UPDATE Claims SET Food_ID = ?, Receiver_ID = ?, Status = ?, Timestamp = ? WHERE Claim_ID = ?"
        );
        assert!(upsert_sql::<Claim>().ends_with(
            "ON CONFLICT(Claim_ID) DO UPDATE SET Food_ID = excluded.Food_ID, \
             Receiver_ID = excluded.Receiver_ID, Status = excluded.Status, \
             Timestamp = excluded.Timestamp"
        ));
    }

    #[tokio::test]
    async fn inserted_row_round_trips() {
        let (_dir, db) = test_pool().await;
        let out = write(&db, bread(Some(10)), WriteMode::Insert).await.unwrap();
        assert_eq!(out, WriteOutcome { id: 10, rows_affected: 1 });

        let fetched: FoodListing = get(&db, 10).await.unwrap().expect("row exists");
        assert_eq!(fetched, bread(Some(10)));
    }

    #[tokio::test]
    async fn insert_without_identity_gets_one_assigned() {
        let (_dir, db) = test_pool().await;
        let provider = Provider {
            name: Some("A".into()),
            city: Some("CityX".into()),
            ..Default::default()
        };
        let first = write(&db, provider.clone(), WriteMode::Insert).await.unwrap();
        let zero_id = Provider {
            provider_id: Some(0),
            ..provider.clone()
        };
        let second = write(&db, zero_id, WriteMode::Insert).await.unwrap();
        assert_ne!(first.id, second.id);

        let fetched: Provider = get(&db, second.id).await.unwrap().unwrap();
        assert_eq!(fetched.provider_id, Some(second.id));
        assert_eq!(fetched.name.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn plain_insert_of_existing_identity_conflicts() {
        let (_dir, db) = test_pool().await;
        write(&db, bread(Some(10)), WriteMode::Insert).await.unwrap();
        let err = write(&db, bread(Some(10)), WriteMode::Insert).await.unwrap_err();
        assert!(matches!(
            err,
            DataError::Conflict { table: "FoodListings", column: "Food_ID", id: 10 }
        ));
    }

    #[tokio::test]
    async fn upsert_overwrites_the_whole_row() {
        let (_dir, db) = test_pool().await;
        write(&db, bread(Some(10)), WriteMode::Upsert).await.unwrap();

        let replacement = FoodListing {
            food_id: Some(10),
            food_name: Some("Rice".into()),
            quantity: Some(2),
            ..Default::default()
        };
        write(&db, replacement.clone(), WriteMode::Upsert).await.unwrap();

        let rows: Vec<FoodListing> = list(&db).await.unwrap();
        assert_eq!(rows, vec![replacement]);
    }

    #[tokio::test]
    async fn replace_requires_an_existing_identity() {
        let (_dir, db) = test_pool().await;

        let err = write(&db, claim(0, "Pending"), WriteMode::Replace).await.unwrap_err();
        assert!(matches!(err, DataError::Validation(_)));

        let out = write(&db, claim(3, "Pending"), WriteMode::Replace).await.unwrap();
        assert_eq!(out.rows_affected, 0);
        assert!(list::<Claim>(&db).await.unwrap().is_empty());

        write(&db, claim(3, "Pending"), WriteMode::Insert).await.unwrap();
        let out = write(&db, claim(3, "Completed"), WriteMode::Replace).await.unwrap();
        assert_eq!(out.rows_affected, 1);
        let fetched: Claim = get(&db, 3).await.unwrap().unwrap();
        assert_eq!(fetched.status.as_deref(), Some("Completed"));
    }

    #[tokio::test]
    async fn write_rejects_malformed_input_before_storage() {
        let (_dir, db) = test_pool().await;
        let mut listing = bread(Some(10));
        listing.expiry_date = Some("tomorrow".into());
        let err = write(&db, listing, WriteMode::Upsert).await.unwrap_err();
        assert!(matches!(err, DataError::Validation(_)));
        assert!(list::<FoodListing>(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn updates_report_affected_rows() {
        let (_dir, db) = test_pool().await;
        write(&db, bread(Some(10)), WriteMode::Insert).await.unwrap();
        write(&db, claim(1, "Pending"), WriteMode::Insert).await.unwrap();

        assert_eq!(update_quantity(&db, 10, 42).await.unwrap(), 1);
        assert_eq!(update_quantity(&db, 99, 42).await.unwrap(), 0);
        let listing: FoodListing = get(&db, 10).await.unwrap().unwrap();
        assert_eq!(listing.quantity, Some(42));

        assert_eq!(update_claim_status(&db, 1, ClaimStatus::Cancelled).await.unwrap(), 1);
        assert_eq!(update_claim_status(&db, 2, ClaimStatus::Completed).await.unwrap(), 0);
        let claims: Vec<Claim> = list(&db).await.unwrap();
        assert_eq!(claims, vec![claim(1, "Cancelled")]);
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_row_without_cascading() {
        let (_dir, db) = test_pool().await;
        for id in [1, 2] {
            let p = Provider {
                provider_id: Some(id),
                name: Some(format!("P{id}")),
                ..Default::default()
            };
            write(&db, p, WriteMode::Insert).await.unwrap();
        }
        write(&db, bread(Some(10)), WriteMode::Insert).await.unwrap();

        assert_eq!(delete(&db, EntityKind::Providers, 7).await.unwrap(), 0);
        assert_eq!(list::<Provider>(&db).await.unwrap().len(), 2);

        assert_eq!(delete(&db, EntityKind::Providers, 1).await.unwrap(), 1);
        let left: Vec<Provider> = list(&db).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].provider_id, Some(2));

        // listing still points at the deleted provider
        let listing: FoodListing = get(&db, 10).await.unwrap().unwrap();
        assert_eq!(listing.provider_id, Some(1));
    }
}
