use axum::{extract::State, response::Json};
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use mongodb::Collection;
use serde_json::json;
use validator::Validate;

use crate::errors::Result;
use crate::middleware::auth::AdminClaims;
use crate::models::notification::{MarkReadRequest, Notification, SendNotificationRequest};
use crate::models::user::Claims;
use crate::state::AppState;

fn notifications(state: &AppState) -> Collection<Notification> {
    state.db.collection("notifications")
}

/// Admin-only: push a notification onto a user's feed.
pub async fn send_notification(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Json(payload): Json<SendNotificationRequest>,
) -> Result<Json<serde_json::Value>> {
    payload.validate()?;

    let notification = Notification {
        id: None,
        user_id: payload.user_id.clone(),
        title: payload.title,
        body: payload.body,
        notification_type: payload.notification_type,
        link: payload.link,
        is_read: false,
        created_at: BsonDateTime::now(),
    };

    notifications(&state).insert_one(&notification).await?;

    tracing::info!("📤 Notification sent to user: {}", payload.user_id);

    Ok(Json(json!({
        "success": true,
        "message": "Notification sent",
        "user_id": payload.user_id,
    })))
}

pub async fn get_my_notifications(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<Notification>>> {
    let cursor = notifications(&state)
        .find(doc! { "user_id": &claims.sub })
        .sort(doc! { "created_at": -1 })
        .limit(50)
        .await?;
    let list: Vec<Notification> = cursor.try_collect().await?;

    Ok(Json(list))
}

pub async fn mark_read(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<MarkReadRequest>,
) -> Result<Json<serde_json::Value>> {
    let mut filter = doc! { "user_id": &claims.sub };

    if let Some(ids) = &payload.notification_ids {
        let object_ids: Vec<ObjectId> = ids
            .iter()
            .filter_map(|id| ObjectId::parse_str(id).ok())
            .collect();
        filter.insert("_id", doc! { "$in": object_ids });
    }

    let result = notifications(&state)
        .update_many(filter, doc! { "$set": { "is_read": true } })
        .await?;

    Ok(Json(json!({
        "success": true,
        "modified_count": result.modified_count,
    })))
}
