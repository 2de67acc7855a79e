use std::fmt;
use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sqlx::{
    query::Query,
    sqlite::{SqliteArguments, SqliteRow},
    FromRow, Sqlite,
};

use super::services::{parse_date, parse_timestamp};
use crate::error::DataError;

pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// The four persisted tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[serde(alias = "Providers")]
    Providers,
    #[serde(alias = "Receivers")]
    Receivers,
    #[serde(alias = "FoodListings", alias = "food-listings")]
    FoodListings,
    #[serde(alias = "Claims")]
    Claims,
}

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Providers => "Providers",
            EntityKind::Receivers => "Receivers",
            EntityKind::FoodListings => "FoodListings",
            EntityKind::Claims => "Claims",
        }
    }

    pub fn id_column(self) -> &'static str {
        match self {
            EntityKind::Providers => "Provider_ID",
            EntityKind::Receivers => "Receiver_ID",
            EntityKind::FoodListings => "Food_ID",
            EntityKind::Claims => "Claim_ID",
        }
    }

    /// CSV file the initial load reads this table from.
    pub fn seed_file(self) -> &'static str {
        match self {
            EntityKind::Providers => "providers_data.csv",
            EntityKind::Receivers => "receivers_data.csv",
            EntityKind::FoodListings => "food_listings_data.csv",
            EntityKind::Claims => "claims_data.csv",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// How a write treats an identity that may already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// New row only; an existing identity is a conflict.
    Insert,
    /// Full overwrite of an existing row; nothing happens when it is absent.
    Replace,
    /// Insert, or fully overwrite the row sharing the identity.
    Upsert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimStatus {
    Pending,
    Completed,
    Cancelled,
}

impl ClaimStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimStatus::Pending => "Pending",
            ClaimStatus::Completed => "Completed",
            ClaimStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ClaimStatus::Pending),
            "Completed" => Ok(ClaimStatus::Completed),
            "Cancelled" => Ok(ClaimStatus::Cancelled),
            other => Err(DataError::validation(format!(
                "status must be Pending, Completed or Cancelled, got {other:?}"
            ))),
        }
    }
}

/// A row type stored in one of the four tables.
///
/// `COLUMNS` lists the data columns after the identity, in the order
/// `bind_columns` binds them.
pub trait Entity:
    for<'r> FromRow<'r, SqliteRow> + DeserializeOwned + Serialize + Send + Unpin + 'static
{
    const KIND: EntityKind;
    const COLUMNS: &'static [&'static str];
    /// Mode used when a write does not name one.
    const DEFAULT_MODE: WriteMode = WriteMode::Insert;

    fn id(&self) -> Option<i64>;
    fn bind_columns<'q>(&self, q: SqliteQuery<'q>) -> SqliteQuery<'q>;

    /// Treats zero identities and zero references as absent.
    fn normalize(self) -> Self;

    fn validate(&self) -> Result<(), DataError> {
        Ok(())
    }
}

fn non_zero(v: Option<i64>) -> Option<i64> {
    v.filter(|id| *id != 0)
}

/// SQLite date functions return NULL on padded text, so stored dates carry none.
fn trimmed(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_owned())
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow)]
pub struct Provider {
    #[serde(default, alias = "Provider_ID")]
    #[sqlx(rename = "Provider_ID")]
    pub provider_id: Option<i64>,
    #[serde(default, alias = "Name")]
    #[sqlx(rename = "Name")]
    pub name: Option<String>,
    #[serde(default, rename = "type", alias = "Type")]
    #[sqlx(rename = "Type")]
    pub kind: Option<String>,
    #[serde(default, alias = "Address")]
    #[sqlx(rename = "Address")]
    pub address: Option<String>,
    #[serde(default, alias = "City")]
    #[sqlx(rename = "City")]
    pub city: Option<String>,
    #[serde(default, alias = "Contact")]
    #[sqlx(rename = "Contact")]
    pub contact: Option<String>,
}

impl Entity for Provider {
    const KIND: EntityKind = EntityKind::Providers;
    const COLUMNS: &'static [&'static str] = &["Name", "Type", "Address", "City", "Contact"];

    fn id(&self) -> Option<i64> {
        self.provider_id
    }

    fn bind_columns<'q>(&self, q: SqliteQuery<'q>) -> SqliteQuery<'q> {
        q.bind(self.name.clone())
            .bind(self.kind.clone())
            .bind(self.address.clone())
            .bind(self.city.clone())
            .bind(self.contact.clone())
    }

    fn normalize(mut self) -> Self {
        self.provider_id = non_zero(self.provider_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow)]
pub struct Receiver {
    #[serde(default, alias = "Receiver_ID")]
    #[sqlx(rename = "Receiver_ID")]
    pub receiver_id: Option<i64>,
    #[serde(default, alias = "Name")]
    #[sqlx(rename = "Name")]
    pub name: Option<String>,
    #[serde(default, rename = "type", alias = "Type")]
    #[sqlx(rename = "Type")]
    pub kind: Option<String>,
    #[serde(default, alias = "City")]
    #[sqlx(rename = "City")]
    pub city: Option<String>,
    #[serde(default, alias = "Contact")]
    #[sqlx(rename = "Contact")]
    pub contact: Option<String>,
}

impl Entity for Receiver {
    const KIND: EntityKind = EntityKind::Receivers;
    const COLUMNS: &'static [&'static str] = &["Name", "Type", "City", "Contact"];

    fn id(&self) -> Option<i64> {
        self.receiver_id
    }

    fn bind_columns<'q>(&self, q: SqliteQuery<'q>) -> SqliteQuery<'q> {
        q.bind(self.name.clone())
            .bind(self.kind.clone())
            .bind(self.city.clone())
            .bind(self.contact.clone())
    }

    fn normalize(mut self) -> Self {
        self.receiver_id = non_zero(self.receiver_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow)]
pub struct FoodListing {
    #[serde(default, alias = "Food_ID")]
    #[sqlx(rename = "Food_ID")]
    pub food_id: Option<i64>,
    #[serde(default, alias = "Food_Name")]
    #[sqlx(rename = "Food_Name")]
    pub food_name: Option<String>,
    #[serde(default, alias = "Quantity")]
    #[sqlx(rename = "Quantity")]
    pub quantity: Option<i64>,
    /// `YYYY-MM-DD`
    #[serde(default, alias = "Expiry_Date")]
    #[sqlx(rename = "Expiry_Date")]
    pub expiry_date: Option<String>,
    #[serde(default, alias = "Provider_ID")]
    #[sqlx(rename = "Provider_ID")]
    pub provider_id: Option<i64>,
    #[serde(default, alias = "Provider_Type")]
    #[sqlx(rename = "Provider_Type")]
    pub provider_type: Option<String>,
    #[serde(default, alias = "Location")]
    #[sqlx(rename = "Location")]
    pub location: Option<String>,
    #[serde(default, alias = "Food_Type")]
    #[sqlx(rename = "Food_Type")]
    pub food_type: Option<String>,
    #[serde(default, alias = "Meal_Type")]
    #[sqlx(rename = "Meal_Type")]
    pub meal_type: Option<String>,
}

impl Entity for FoodListing {
    const KIND: EntityKind = EntityKind::FoodListings;
    const DEFAULT_MODE: WriteMode = WriteMode::Upsert;
    const COLUMNS: &'static [&'static str] = &[
        "Food_Name",
        "Quantity",
        "Expiry_Date",
        "Provider_ID",
        "Provider_Type",
        "Location",
        "Food_Type",
        "Meal_Type",
    ];

    fn id(&self) -> Option<i64> {
        self.food_id
    }

    fn bind_columns<'q>(&self, q: SqliteQuery<'q>) -> SqliteQuery<'q> {
        q.bind(self.food_name.clone())
            .bind(self.quantity)
            .bind(self.expiry_date.clone())
            .bind(self.provider_id)
            .bind(self.provider_type.clone())
            .bind(self.location.clone())
            .bind(self.food_type.clone())
            .bind(self.meal_type.clone())
    }

    fn normalize(mut self) -> Self {
        self.food_id = non_zero(self.food_id);
        self.provider_id = non_zero(self.provider_id);
        self.expiry_date = trimmed(self.expiry_date);
        self
    }

    fn validate(&self) -> Result<(), DataError> {
        if let Some(expiry) = &self.expiry_date {
            parse_date(expiry)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow)]
pub struct Claim {
    #[serde(default, alias = "Claim_ID")]
    #[sqlx(rename = "Claim_ID")]
    pub claim_id: Option<i64>,
    #[serde(default, alias = "Food_ID")]
    #[sqlx(rename = "Food_ID")]
    pub food_id: Option<i64>,
    #[serde(default, alias = "Receiver_ID")]
    #[sqlx(rename = "Receiver_ID")]
    pub receiver_id: Option<i64>,
    /// Stored as text; the store accepts any value, writes through the API
    /// are limited to [`ClaimStatus`].
    #[serde(default, alias = "Status")]
    #[sqlx(rename = "Status")]
    pub status: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`
    #[serde(default, alias = "Timestamp")]
    #[sqlx(rename = "Timestamp")]
    pub timestamp: Option<String>,
}

impl Entity for Claim {
    const KIND: EntityKind = EntityKind::Claims;
    const DEFAULT_MODE: WriteMode = WriteMode::Upsert;
    const COLUMNS: &'static [&'static str] = &["Food_ID", "Receiver_ID", "Status", "Timestamp"];

    fn id(&self) -> Option<i64> {
        self.claim_id
    }

    fn bind_columns<'q>(&self, q: SqliteQuery<'q>) -> SqliteQuery<'q> {
        q.bind(self.food_id)
            .bind(self.receiver_id)
            .bind(self.status.clone())
            .bind(self.timestamp.clone())
    }

    fn normalize(mut self) -> Self {
        self.claim_id = non_zero(self.claim_id);
        self.food_id = non_zero(self.food_id);
        self.receiver_id = non_zero(self.receiver_id);
        self.status = trimmed(self.status);
        self.timestamp = trimmed(self.timestamp);
        self
    }

    fn validate(&self) -> Result<(), DataError> {
        match &self.status {
            Some(status) => {
                status.parse::<ClaimStatus>()?;
            }
            None => return Err(DataError::validation("claim status is required")),
        }
        if let Some(ts) = &self.timestamp {
            parse_timestamp(ts)?;
        }
        Ok(())
    }
}
