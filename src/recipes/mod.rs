//! Recipes: search and CRUD, ingredient associations, derived difficulty and
//! per-recipe charts.

mod difficulty;
mod dto;
pub mod handlers;
mod repo;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::router()
}
