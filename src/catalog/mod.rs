use crate::state::AppState;
use axum::Router;

pub mod categories;
mod dto;
pub mod handlers;
pub mod likes;
pub mod repo;
pub mod search;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::browse_routes())
        .merge(handlers::recipe_routes())
}
