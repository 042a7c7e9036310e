use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers::tournaments;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(tournaments::list_tournaments).post(tournaments::create_tournament),
        )
        .route("/featured", get(tournaments::featured_tournament))
        .route(
            "/:id",
            get(tournaments::get_tournament).delete(tournaments::delete_tournament),
        )
        .route("/:id/bracket", get(tournaments::get_bracket))
        .route("/:id/join", post(tournaments::join_tournament))
        .route("/:id/status", patch(tournaments::update_status))
        .route("/:id/featured", patch(tournaments::set_featured))
        .route("/:id/room", patch(tournaments::update_room_details))
}
