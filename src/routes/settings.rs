use axum::{routing::get, Router};

use crate::handlers::settings;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(settings::get_settings).put(settings::update_settings),
    )
}
