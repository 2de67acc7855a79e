pub mod dto;
pub mod handlers;
pub mod model;
pub mod repo;
pub(crate) mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::table_routes())
        .merge(handlers::write_routes())
}
