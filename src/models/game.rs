use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub icon_url: String,
    pub banner_url: String,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGame {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(url)]
    pub icon_url: String,
    #[validate(url)]
    pub banner_url: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGame {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(url)]
    pub icon_url: Option<String>,
    #[validate(url)]
    pub banner_url: Option<String>,
}
