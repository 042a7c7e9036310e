use axum::{routing::get, Router};

use crate::handlers::user_profile;
use crate::state::AppState;

pub fn profile_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(user_profile::get_profile).put(user_profile::update_profile),
    )
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/leaderboard", get(user_profile::leaderboard))
}
