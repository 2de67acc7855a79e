//! The fifteen read-only reports. Each call runs against the pool, returns a
//! fully materialized result and keeps no state between calls.
//!
//! Descending reports break ties on their label column ascending.

use sqlx::SqlitePool;

use super::dto::*;
use crate::error::DataError;
use crate::records::services::{parse_date, require_non_empty};

/// Providers and receivers per city, for every city that has a provider.
pub async fn providers_receivers_per_city(db: &SqlitePool) -> Result<Vec<CityCounts>, DataError> {
    let rows = sqlx::query_as::<_, CityCounts>(
        r#"
        SELECT pr.City AS city,
               (SELECT COUNT(*) FROM Providers p WHERE p.City = pr.City) AS provider_count,
               (SELECT COUNT(*) FROM Receivers r WHERE r.City = pr.City) AS receiver_count
          FROM Providers pr
         GROUP BY pr.City
         ORDER BY pr.City
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn listings_per_provider_type(
    db: &SqlitePool,
) -> Result<Vec<ProviderTypeListings>, DataError> {
    let rows = sqlx::query_as::<_, ProviderTypeListings>(
        r#"
        SELECT Provider_Type AS provider_type, COUNT(*) AS total_food_items
          FROM FoodListings
         GROUP BY Provider_Type
         ORDER BY total_food_items DESC, provider_type
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Name and contact of every provider whose city equals `city`.
pub async fn provider_contacts_by_city(
    db: &SqlitePool,
    city: &str,
) -> Result<Vec<ProviderContact>, DataError> {
    let city = require_non_empty("city", city)?;
    let rows = sqlx::query_as::<_, ProviderContact>(
        r#"
        SELECT Name AS name, Contact AS contact
          FROM Providers
         WHERE City = ?
         ORDER BY Provider_ID
        "#,
    )
    .bind(city)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn top_receivers(db: &SqlitePool) -> Result<Vec<ReceiverClaims>, DataError> {
    let rows = sqlx::query_as::<_, ReceiverClaims>(
        r#"
        SELECT r.Name AS name, COUNT(c.Claim_ID) AS claims_made
          FROM Claims c
          JOIN Receivers r ON c.Receiver_ID = r.Receiver_ID
         GROUP BY r.Name
         ORDER BY claims_made DESC, name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Always exactly one row; an empty table sums to 0.
pub async fn total_food_quantity(db: &SqlitePool) -> Result<Vec<TotalQuantity>, DataError> {
    let rows = sqlx::query_as::<_, TotalQuantity>(
        "SELECT COALESCE(SUM(Quantity), 0) AS total_quantity FROM FoodListings",
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn listings_per_location(db: &SqlitePool) -> Result<Vec<LocationListings>, DataError> {
    let rows = sqlx::query_as::<_, LocationListings>(
        r#"
        SELECT Location AS location, COUNT(*) AS listing_count
          FROM FoodListings
         GROUP BY Location
         ORDER BY listing_count DESC, location
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn most_common_food_types(db: &SqlitePool) -> Result<Vec<FoodTypeListings>, DataError> {
    let rows = sqlx::query_as::<_, FoodTypeListings>(
        r#"
        SELECT Food_Type AS food_type, COUNT(*) AS count
          FROM FoodListings
         GROUP BY Food_Type
         ORDER BY count DESC, food_type
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn claims_per_food_item(db: &SqlitePool) -> Result<Vec<FoodClaims>, DataError> {
    let rows = sqlx::query_as::<_, FoodClaims>(
        r#"
        SELECT f.Food_Name AS food_name, COUNT(c.Claim_ID) AS claims_count
          FROM Claims c
          JOIN FoodListings f ON c.Food_ID = f.Food_ID
         GROUP BY f.Food_Name
         ORDER BY claims_count DESC, food_name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Completed claims per provider, through the claimed listing.
pub async fn successful_claims_per_provider(
    db: &SqlitePool,
) -> Result<Vec<ProviderSuccessfulClaims>, DataError> {
    let rows = sqlx::query_as::<_, ProviderSuccessfulClaims>(
        r#"
        SELECT p.Name AS name, COUNT(c.Claim_ID) AS successful_claims
          FROM Claims c
          JOIN FoodListings f ON c.Food_ID = f.Food_ID
          JOIN Providers p ON f.Provider_ID = p.Provider_ID
         WHERE c.Status = 'Completed'
         GROUP BY p.Name
         ORDER BY successful_claims DESC, name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Share of each status among all claims, in percent rounded to 2 decimals.
///
/// With no claims at all the result is empty.
pub async fn claim_status_percentage(db: &SqlitePool) -> Result<Vec<StatusShare>, DataError> {
    let mut conn = db.acquire().await?;
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Claims")
        .fetch_one(&mut *conn)
        .await?;
    if total == 0 {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, StatusShare>(
        r#"
        SELECT Status AS status, ROUND(COUNT(*) * 100.0 / ?, 2) AS percentage
          FROM Claims
         GROUP BY Status
         ORDER BY Status
        "#,
    )
    .bind(total)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

pub async fn avg_quantity_per_receiver(
    db: &SqlitePool,
) -> Result<Vec<ReceiverAvgQuantity>, DataError> {
    let rows = sqlx::query_as::<_, ReceiverAvgQuantity>(
        r#"
        SELECT r.Name AS name, AVG(f.Quantity) AS avg_quantity
          FROM Claims c
          JOIN Receivers r ON c.Receiver_ID = r.Receiver_ID
          JOIN FoodListings f ON c.Food_ID = f.Food_ID
         GROUP BY r.Name
         ORDER BY r.Name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn claims_per_meal_type(db: &SqlitePool) -> Result<Vec<MealTypeClaims>, DataError> {
    let rows = sqlx::query_as::<_, MealTypeClaims>(
        r#"
        SELECT f.Meal_Type AS meal_type, COUNT(c.Claim_ID) AS claims_count
          FROM Claims c
          JOIN FoodListings f ON c.Food_ID = f.Food_ID
         GROUP BY f.Meal_Type
         ORDER BY claims_count DESC, meal_type
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn total_donated_by_provider(
    db: &SqlitePool,
) -> Result<Vec<ProviderDonations>, DataError> {
    let rows = sqlx::query_as::<_, ProviderDonations>(
        r#"
        SELECT p.Name AS name, COALESCE(SUM(f.Quantity), 0) AS total_donated
          FROM FoodListings f
          JOIN Providers p ON f.Provider_ID = p.Provider_ID
         GROUP BY p.Name
         ORDER BY total_donated DESC, name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Listings whose expiry date is strictly before `before` (`YYYY-MM-DD`).
pub async fn expired_food_items(
    db: &SqlitePool,
    before: &str,
) -> Result<Vec<ExpiredItem>, DataError> {
    let before = parse_date(before)?;
    let rows = sqlx::query_as::<_, ExpiredItem>(
        r#"
        SELECT Food_Name AS food_name, Expiry_Date AS expiry_date
          FROM FoodListings
         WHERE DATE(Expiry_Date) < DATE(?)
         ORDER BY DATE(Expiry_Date), Food_ID
        "#,
    )
    .bind(before.to_string())
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn top_cities_by_quantity(db: &SqlitePool) -> Result<Vec<LocationQuantity>, DataError> {
    let rows = sqlx::query_as::<_, LocationQuantity>(
        r#"
        SELECT Location AS location, COALESCE(SUM(Quantity), 0) AS total_quantity
          FROM FoodListings
         GROUP BY Location
         ORDER BY total_quantity DESC, location
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Runs every report; the city and date filtered ones only when given.
pub async fn dashboard(db: &SqlitePool, query: &DashboardQuery) -> Result<Dashboard, DataError> {
    let provider_contacts = match query.city.as_deref() {
        Some(city) => Some(provider_contacts_by_city(db, city).await?),
        None => None,
    };
    let expired = match query.before.as_deref() {
        Some(before) => Some(expired_food_items(db, before).await?),
        None => None,
    };

    Ok(Dashboard {
        city_counts: providers_receivers_per_city(db).await?,
        provider_types: listings_per_provider_type(db).await?,
        provider_contacts,
        top_receivers: top_receivers(db).await?,
        total_quantity: total_food_quantity(db).await?,
        listings_by_location: listings_per_location(db).await?,
        food_types: most_common_food_types(db).await?,
        claims_by_food: claims_per_food_item(db).await?,
        successful_claims_by_provider: successful_claims_per_provider(db).await?,
        claim_status_share: claim_status_percentage(db).await?,
        avg_quantity_by_receiver: avg_quantity_per_receiver(db).await?,
        claims_by_meal_type: claims_per_meal_type(db).await?,
        donations_by_provider: total_donated_by_provider(db).await?,
        expired,
        quantity_by_location: top_cities_by_quantity(db).await?,
    })
}
