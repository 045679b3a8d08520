use crate::state::AppState;
use axum::Router;

mod claims;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod repo;
pub mod signature;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
