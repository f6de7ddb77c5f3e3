//! Shared ingredient catalog: search and CRUD plus catalog-wide charts.

mod dto;
pub mod handlers;
pub mod repo;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::router()
}
