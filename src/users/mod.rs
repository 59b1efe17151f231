pub mod credentials;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod repo;
mod repo_types;
pub mod schema;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use error::UserError;
pub use schema::{validate, UserCandidate, UserRecord, ValidationError};

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
