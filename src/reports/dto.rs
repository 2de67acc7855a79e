use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct ExpiryQuery {
    /// `YYYY-MM-DD`; listings expiring strictly before it are returned.
    pub before: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub city: Option<String>,
    pub before: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CityCounts {
    pub city: Option<String>,
    pub provider_count: i64,
    pub receiver_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProviderTypeListings {
    pub provider_type: Option<String>,
    pub total_food_items: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProviderContact {
    pub name: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ReceiverClaims {
    pub name: Option<String>,
    pub claims_made: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TotalQuantity {
    pub total_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LocationListings {
    pub location: Option<String>,
    pub listing_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FoodTypeListings {
    pub food_type: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FoodClaims {
    pub food_name: Option<String>,
    pub claims_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProviderSuccessfulClaims {
    pub name: Option<String>,
    pub successful_claims: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StatusShare {
    pub status: Option<String>,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ReceiverAvgQuantity {
    pub name: Option<String>,
    pub avg_quantity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MealTypeClaims {
    pub meal_type: Option<String>,
    pub claims_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProviderDonations {
    pub name: Option<String>,
    pub total_donated: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ExpiredItem {
    pub food_name: Option<String>,
    pub expiry_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LocationQuantity {
    pub location: Option<String>,
    pub total_quantity: i64,
}

/// Every report in one response. The two filtered reports are present only
/// when their input was supplied.
#[derive(Debug, Serialize, Deserialize)]
pub struct Dashboard {
    pub city_counts: Vec<CityCounts>,
    pub provider_types: Vec<ProviderTypeListings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_contacts: Option<Vec<ProviderContact>>,
    pub top_receivers: Vec<ReceiverClaims>,
    pub total_quantity: Vec<TotalQuantity>,
    pub listings_by_location: Vec<LocationListings>,
    pub food_types: Vec<FoodTypeListings>,
    pub claims_by_food: Vec<FoodClaims>,
    pub successful_claims_by_provider: Vec<ProviderSuccessfulClaims>,
    pub claim_status_share: Vec<StatusShare>,
    pub avg_quantity_by_receiver: Vec<ReceiverAvgQuantity>,
    pub claims_by_meal_type: Vec<MealTypeClaims>,
    pub donations_by_provider: Vec<ProviderDonations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired: Option<Vec<ExpiredItem>>,
    pub quantity_by_location: Vec<LocationQuantity>,
}
