use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::teams;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(teams::create_team))
        .route("/:id", get(teams::get_team).delete(teams::delete_team))
        .route("/:id/members", post(teams::add_member))
        .route("/:id/members/:uid", delete(teams::remove_member))
}
