use axum::{
    routing::{get, patch},
    Router,
};

use crate::handlers::sponsorships;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(sponsorships::list_requests).post(sponsorships::submit_request),
        )
        .route("/:id/status", patch(sponsorships::update_status))
}
