pub mod admission;
pub mod dlq;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().merge(admission::router()).merge(dlq::router())
}
