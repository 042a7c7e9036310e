use axum::{routing::get, Router};

use crate::handlers::games;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(games::list_games).post(games::create_game))
        .route(
            "/:id",
            get(games::get_game)
                .put(games::update_game)
                .delete(games::delete_game),
        )
}
