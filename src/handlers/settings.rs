use axum::{extract::State, response::Json};
use mongodb::bson::doc;
use mongodb::Collection;

use crate::errors::Result;
use crate::middleware::auth::AdminClaims;
use crate::models::settings::{SiteSettings, UpdateSiteSettings, SETTINGS_DOC_ID};
use crate::state::AppState;

fn settings(state: &AppState) -> Collection<SiteSettings> {
    state.db.collection("site_settings")
}

/// Public read of the singleton settings document; defaults when the
/// document has never been written.
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<SiteSettings>> {
    let current = settings(&state)
        .find_one(doc! { "_id": SETTINGS_DOC_ID })
        .await?
        .unwrap_or_default();

    Ok(Json(current))
}

/// Admin-only upsert of individual toggles.
pub async fn update_settings(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Json(payload): Json<UpdateSiteSettings>,
) -> Result<Json<SiteSettings>> {
    let mut current = settings(&state)
        .find_one(doc! { "_id": SETTINGS_DOC_ID })
        .await?
        .unwrap_or_default();

    if let Some(board) = payload.promotion_board {
        current.promotion_board = board;
    }
    if let Some(ads) = payload.ads_enabled {
        current.ads_enabled = ads;
    }
    if let Some(maintenance) = payload.maintenance_mode {
        current.maintenance_mode = maintenance;
    }
    if let Some(open) = payload.registration_open {
        current.registration_open = open;
    }

    settings(&state)
        .replace_one(doc! { "_id": SETTINGS_DOC_ID }, &current)
        .upsert(true)
        .await?;

    tracing::info!("⚙️ Site settings updated");

    Ok(Json(current))
}
