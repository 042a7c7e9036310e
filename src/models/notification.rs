use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub notification_type: String, // "tournament", "team", "system"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: BsonDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendNotificationRequest {
    pub user_id: String,
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[validate(length(min = 1, max = 1000))]
    pub body: String,
    pub notification_type: String,
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    /// When absent, every unread notification of the caller is marked.
    pub notification_ids: Option<Vec<String>>,
}
