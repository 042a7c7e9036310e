use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::notifications;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(notifications::get_my_notifications).post(notifications::send_notification),
        )
        .route("/read", post(notifications::mark_read))
}
