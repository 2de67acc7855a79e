use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{dto::*, repo};
use crate::{error::reject, state::AppState};

type ReportResult<T> = Result<Json<Vec<T>>, (StatusCode, String)>;

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(dashboard))
        .route("/reports/city_counts", get(city_counts))
        .route("/reports/provider_types", get(provider_types))
        .route("/reports/provider_contacts", get(provider_contacts))
        .route("/reports/top_receivers", get(top_receivers))
        .route("/reports/total_quantity", get(total_quantity))
        .route("/reports/listings_by_location", get(listings_by_location))
        .route("/reports/food_types", get(food_types))
        .route("/reports/claims_by_food", get(claims_by_food))
        .route("/reports/successful_claims_by_provider", get(successful_claims_by_provider))
        .route("/reports/claim_status_share", get(claim_status_share))
        .route("/reports/avg_quantity_by_receiver", get(avg_quantity_by_receiver))
        .route("/reports/claims_by_meal_type", get(claims_by_meal_type))
        .route("/reports/donations_by_provider", get(donations_by_provider))
        .route("/reports/expired", get(expired))
        .route("/reports/quantity_by_location", get(quantity_by_location))
}

/// GET /reports?city=..&before=YYYY-MM-DD
#[instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    Query(q): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, (StatusCode, String)> {
    let dashboard = repo::dashboard(&state.db, &q).await.map_err(reject)?;
    Ok(Json(dashboard))
}

#[instrument(skip(state))]
pub async fn city_counts(State(state): State<AppState>) -> ReportResult<CityCounts> {
    repo::providers_receivers_per_city(&state.db)
        .await
        .map(Json)
        .map_err(reject)
}

#[instrument(skip(state))]
pub async fn provider_types(State(state): State<AppState>) -> ReportResult<ProviderTypeListings> {
    repo::listings_per_provider_type(&state.db)
        .await
        .map(Json)
        .map_err(reject)
}

#[instrument(skip(state))]
pub async fn provider_contacts(
    State(state): State<AppState>,
    Query(q): Query<CityQuery>,
) -> ReportResult<ProviderContact> {
    repo::provider_contacts_by_city(&state.db, &q.city)
        .await
        .map(Json)
        .map_err(reject)
}

#[instrument(skip(state))]
pub async fn top_receivers(State(state): State<AppState>) -> ReportResult<ReceiverClaims> {
    repo::top_receivers(&state.db).await.map(Json).map_err(reject)
}

#[instrument(skip(state))]
pub async fn total_quantity(State(state): State<AppState>) -> ReportResult<TotalQuantity> {
    repo::total_food_quantity(&state.db)
        .await
        .map(Json)
        .map_err(reject)
}

#[instrument(skip(state))]
pub async fn listings_by_location(State(state): State<AppState>) -> ReportResult<LocationListings> {
    repo::listings_per_location(&state.db)
        .await
        .map(Json)
        .map_err(reject)
}

#[instrument(skip(state))]
pub async fn food_types(State(state): State<AppState>) -> ReportResult<FoodTypeListings> {
    repo::most_common_food_types(&state.db)
        .await
        .map(Json)
        .map_err(reject)
}

#[instrument(skip(state))]
pub async fn claims_by_food(State(state): State<AppState>) -> ReportResult<FoodClaims> {
    repo::claims_per_food_item(&state.db)
        .await
        .map(Json)
        .map_err(reject)
}

#[instrument(skip(state))]
pub async fn successful_claims_by_provider(
    State(state): State<AppState>,
) -> ReportResult<ProviderSuccessfulClaims> {
    repo::successful_claims_per_provider(&state.db)
        .await
        .map(Json)
        .map_err(reject)
}

#[instrument(skip(state))]
pub async fn claim_status_share(State(state): State<AppState>) -> ReportResult<StatusShare> {
    repo::claim_status_percentage(&state.db)
        .await
        .map(Json)
        .map_err(reject)
}

#[instrument(skip(state))]
pub async fn avg_quantity_by_receiver(
    State(state): State<AppState>,
) -> ReportResult<ReceiverAvgQuantity> {
    repo::avg_quantity_per_receiver(&state.db)
        .await
        .map(Json)
        .map_err(reject)
}

#[instrument(skip(state))]
pub async fn claims_by_meal_type(State(state): State<AppState>) -> ReportResult<MealTypeClaims> {
    repo::claims_per_meal_type(&state.db)
        .await
        .map(Json)
        .map_err(reject)
}

#[instrument(skip(state))]
pub async fn donations_by_provider(
    State(state): State<AppState>,
) -> ReportResult<ProviderDonations> {
    repo::total_donated_by_provider(&state.db)
        .await
        .map(Json)
        .map_err(reject)
}

#[instrument(skip(state))]
pub async fn expired(
    State(state): State<AppState>,
    Query(q): Query<ExpiryQuery>,
) -> ReportResult<ExpiredItem> {
    repo::expired_food_items(&state.db, &q.before)
        .await
        .map(Json)
        .map_err(reject)
}

#[instrument(skip(state))]
pub async fn quantity_by_location(
    State(state): State<AppState>,
) -> ReportResult<LocationQuantity> {
    repo::top_cities_by_quantity(&state.db)
        .await
        .map(Json)
        .map_err(reject)
}
