use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{MutationResponse, UpdateQuantityRequest, UpdateStatusRequest, WriteParams},
    model::{Claim, Entity, EntityKind, FoodListing, Provider, Receiver, WriteMode},
    repo::{self, WriteOutcome},
};
use crate::{error::reject, state::AppState};

pub fn table_routes() -> Router<AppState> {
    Router::new()
        .route("/tables/:table", get(list_rows))
        .route("/tables/:table/:id", get(get_row).delete(delete_row))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/providers", post(create::<Provider>))
        .route("/receivers", post(create::<Receiver>))
        .route("/food_listings", post(create::<FoodListing>))
        .route("/claims", post(create::<Claim>))
        .route("/food_listings/:id/quantity", patch(update_quantity))
        .route("/claims/:id/status", patch(update_claim_status))
}

#[instrument(skip(state))]
pub async fn list_rows(
    State(state): State<AppState>,
    Path(table): Path<EntityKind>,
) -> Result<Response, (StatusCode, String)> {
    let db = &state.db;
    let res = match table {
        EntityKind::Providers => repo::list::<Provider>(db).await.map(into_json),
        EntityKind::Receivers => repo::list::<Receiver>(db).await.map(into_json),
        EntityKind::FoodListings => repo::list::<FoodListing>(db).await.map(into_json),
        EntityKind::Claims => repo::list::<Claim>(db).await.map(into_json),
    };
    res.map_err(reject)
}

#[instrument(skip(state))]
pub async fn get_row(
    State(state): State<AppState>,
    Path((table, id)): Path<(EntityKind, i64)>,
) -> Result<Response, (StatusCode, String)> {
    let db = &state.db;
    let found = match table {
        EntityKind::Providers => repo::get::<Provider>(db, id).await.map(|r| r.map(into_json)),
        EntityKind::Receivers => repo::get::<Receiver>(db, id).await.map(|r| r.map(into_json)),
        EntityKind::FoodListings => repo::get::<FoodListing>(db, id).await.map(|r| r.map(into_json)),
        EntityKind::Claims => repo::get::<Claim>(db, id).await.map(|r| r.map(into_json)),
    }
    .map_err(reject)?;

    found.ok_or_else(|| {
        warn!(%table, id, "row not found");
        not_found(table, id)
    })
}

#[instrument(skip(state))]
pub async fn delete_row(
    State(state): State<AppState>,
    Path((table, id)): Path<(EntityKind, i64)>,
) -> Result<Json<MutationResponse>, (StatusCode, String)> {
    let rows_affected = repo::delete(&state.db, table, id).await.map_err(reject)?;
    if rows_affected == 0 {
        warn!(%table, id, "delete matched no row");
        return Err(not_found(table, id));
    }
    info!(%table, id, "row deleted");
    Ok(Json(MutationResponse { rows_affected }))
}

/// POST /{table}?mode=insert|replace|upsert with one full row as the body.
#[instrument(skip(state, record), fields(table = E::KIND.table()))]
pub async fn create<E: Entity>(
    State(state): State<AppState>,
    Query(params): Query<WriteParams>,
    Json(record): Json<E>,
) -> Result<(StatusCode, Json<WriteOutcome>), (StatusCode, String)> {
    let mode = params.mode.unwrap_or(E::DEFAULT_MODE);
    let outcome = repo::write(&state.db, record, mode).await.map_err(reject)?;

    let status = match mode {
        WriteMode::Replace if outcome.rows_affected == 0 => {
            warn!(id = outcome.id, "replace matched no row");
            return Err(not_found(E::KIND, outcome.id));
        }
        WriteMode::Insert => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    info!(id = outcome.id, ?mode, "row written");
    Ok((status, Json(outcome)))
}

#[instrument(skip(state))]
pub async fn update_quantity(
    State(state): State<AppState>,
    Path(food_id): Path<i64>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Json<MutationResponse>, (StatusCode, String)> {
    let rows_affected = repo::update_quantity(&state.db, food_id, body.quantity)
        .await
        .map_err(reject)?;
    if rows_affected == 0 {
        warn!(food_id, "quantity update matched no listing");
        return Err(not_found(EntityKind::FoodListings, food_id));
    }
    info!(food_id, quantity = body.quantity, "quantity updated");
    Ok(Json(MutationResponse { rows_affected }))
}

#[instrument(skip(state))]
pub async fn update_claim_status(
    State(state): State<AppState>,
    Path(claim_id): Path<i64>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<MutationResponse>, (StatusCode, String)> {
    let rows_affected = repo::update_claim_status(&state.db, claim_id, body.status)
        .await
        .map_err(reject)?;
    if rows_affected == 0 {
        warn!(claim_id, "status update matched no claim");
        return Err(not_found(EntityKind::Claims, claim_id));
    }
    info!(claim_id, status = %body.status, "claim status updated");
    Ok(Json(MutationResponse { rows_affected }))
}

fn into_json<T: serde::Serialize>(value: T) -> Response {
    Json(value).into_response()
}

fn not_found(table: EntityKind, id: i64) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!("no {table} row with {} = {id}", table.id_column()),
    )
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{app::build_app, state::AppState, storage::test_pool};

    async fn send(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let res = app.oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn create_then_fetch_provider() {
        let (_dir, db) = test_pool().await;
        let app = build_app(AppState::for_pool(db));

        let body = serde_json::json!({
            "name": "A", "type": "Grocery", "address": "addr", "city": "CityX", "contact": "c1"
        });
        let (status, bytes) = send(app.clone(), Method::POST, "/api/v1/providers", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        let outcome: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let id = outcome["id"].as_i64().unwrap();

        let (status, bytes) = send(app, Method::GET, &format!("/api/v1/tables/providers/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let provider: Provider = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(provider.city.as_deref(), Some("CityX"));
        assert_eq!(provider.kind.as_deref(), Some("Grocery"));
    }

    #[tokio::test]
    async fn missing_rows_surface_as_not_found() {
        let (_dir, db) = test_pool().await;
        let app = build_app(AppState::for_pool(db));

        let (status, _) = send(app.clone(), Method::DELETE, "/api/v1/tables/Claims/5", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            app.clone(),
            Method::PATCH,
            "/api/v1/food_listings/9/quantity",
            Some(serde_json::json!({ "quantity": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            app,
            Method::POST,
            "/api/v1/claims?mode=replace",
            Some(serde_json::json!({ "claim_id": 4, "status": "Pending" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_input_is_rejected() {
        let (_dir, db) = test_pool().await;
        let app = build_app(AppState::for_pool(db));

        let (status, _) = send(app.clone(), Method::GET, "/api/v1/tables/claims/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            app.clone(),
            Method::POST,
            "/api/v1/food_listings",
            Some(serde_json::json!({ "food_name": "Bread", "expiry_date": "someday" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            app,
            Method::PATCH,
            "/api/v1/claims/1/status",
            Some(serde_json::json!({ "status": "Lost" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn claim_without_status_is_rejected() {
        let (_dir, db) = test_pool().await;
        let app = build_app(AppState::for_pool(db));

        let (status, _) = send(
            app.clone(),
            Method::POST,
            "/api/v1/claims",
            Some(serde_json::json!({ "claim_id": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app, Method::GET, "/api/v1/tables/claims/5", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listing_upsert_then_status_flow() {
        let (_dir, db) = test_pool().await;
        let app = build_app(AppState::for_pool(db));

        let listing = serde_json::json!({
            "food_id": 10, "food_name": "Bread", "quantity": 5, "expiry_date": "2024-01-01"
        });
        let (status, _) = send(app.clone(), Method::POST, "/api/v1/food_listings", Some(listing.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(app.clone(), Method::POST, "/api/v1/food_listings", Some(listing)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, bytes) = send(app.clone(), Method::GET, "/api/v1/tables/food_listings", None).await;
        assert_eq!(status, StatusCode::OK);
        let rows: Vec<FoodListing> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(rows.len(), 1);

        let claim = serde_json::json!({
            "claim_id": 1, "food_id": 10, "receiver_id": 1,
            "status": "Pending", "timestamp": "2024-01-02 10:00:00"
        });
        send(app.clone(), Method::POST, "/api/v1/claims", Some(claim)).await;
        let (status, bytes) = send(
            app,
            Method::PATCH,
            "/api/v1/claims/1/status",
            Some(serde_json::json!({ "status": "Completed" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let res: MutationResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(res, MutationResponse { rows_affected: 1 });
    }
}
