use axum::{
    extract::{Path, State},
    response::Json,
};
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use mongodb::Collection;
use serde_json::json;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::middleware::auth::AdminClaims;
use crate::models::sponsorship::{
    CreateSponsorshipRequest, SponsorshipRequest, UpdateSponsorshipStatus, SPONSORSHIP_STATUSES,
};
use crate::state::AppState;

fn sponsorships(state: &AppState) -> Collection<SponsorshipRequest> {
    state.db.collection("sponsorship_requests")
}

/// Public form submission from the "sponsor us" page.
pub async fn submit_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateSponsorshipRequest>,
) -> Result<Json<serde_json::Value>> {
    payload.validate()?;

    let request = SponsorshipRequest {
        id: None,
        brand_name: payload.brand_name,
        contact_name: payload.contact_name,
        email: payload.email,
        sponsorship_type: payload.sponsorship_type,
        message: payload.message,
        status: "New".to_string(),
        created_at: BsonDateTime::now(),
    };

    sponsorships(&state).insert_one(&request).await?;

    tracing::info!("🤝 Sponsorship request received from '{}'", request.brand_name);

    Ok(Json(json!({
        "success": true,
        "message": "Request submitted, we will be in touch",
    })))
}

pub async fn list_requests(
    State(state): State<AppState>,
    _admin: AdminClaims,
) -> Result<Json<Vec<SponsorshipRequest>>> {
    let cursor = sponsorships(&state)
        .find(doc! {})
        .sort(doc! { "created_at": -1 })
        .await?;
    let list: Vec<SponsorshipRequest> = cursor.try_collect().await?;

    Ok(Json(list))
}

pub async fn update_status(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(id): Path<String>,
    Json(payload): Json<UpdateSponsorshipStatus>,
) -> Result<Json<serde_json::Value>> {
    if !SPONSORSHIP_STATUSES.contains(&payload.status.as_str()) {
        return Err(AppError::invalid_data(format!(
            "Invalid status. Must be one of: {:?}",
            SPONSORSHIP_STATUSES
        )));
    }

    let object_id = ObjectId::parse_str(&id)?;
    let result = sponsorships(&state)
        .update_one(
            doc! { "_id": object_id },
            doc! { "$set": { "status": &payload.status } },
        )
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::NotFound("Sponsorship request"));
    }

    Ok(Json(json!({
        "success": true,
        "status": payload.status,
    })))
}
