use axum::{extract::State, response::Json};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Collection;
use serde::Serialize;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::user::{Claims, LeaderboardEntry, UpdateProfile, User};
use crate::state::AppState;

/// Profile view: the user document minus the password hash.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub is_admin: bool,
    pub bio: Option<String>,
    pub favorite_game_ids: Vec<String>,
    pub streaming_channel_url: Option<String>,
    pub friend_uids: Vec<String>,
    pub team_id: Option<String>,
    pub points: i64,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        ProfileResponse {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: user.email,
            display_name: user.display_name,
            photo_url: user.photo_url,
            is_admin: user.is_admin,
            bio: user.bio,
            favorite_game_ids: user.favorite_game_ids,
            streaming_channel_url: user.streaming_channel_url,
            friend_uids: user.friend_uids,
            team_id: user.team_id,
            points: user.points,
        }
    }
}

fn users(state: &AppState) -> Collection<User> {
    state.db.collection("users")
}

pub async fn get_profile(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<ProfileResponse>> {
    let object_id = ObjectId::parse_str(&claims.sub)?;

    let user = users(&state)
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(Json(ProfileResponse::from(user)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<UpdateProfile>,
) -> Result<Json<ProfileResponse>> {
    payload.validate()?;

    let object_id = ObjectId::parse_str(&claims.sub)?;

    let mut set = doc! {
        "updated_at": mongodb::bson::DateTime::from_chrono(Utc::now()),
    };
    if let Some(bio) = &payload.bio {
        set.insert("bio", bio);
    }
    if let Some(favorites) = &payload.favorite_game_ids {
        set.insert("favorite_game_ids", favorites);
    }
    if let Some(url) = &payload.streaming_channel_url {
        set.insert("streaming_channel_url", url);
    }
    if let Some(url) = &payload.photo_url {
        set.insert("photo_url", url);
    }

    let filter = doc! { "_id": object_id };
    let result = users(&state)
        .update_one(filter.clone(), doc! { "$set": set })
        .await?;
    if result.matched_count == 0 {
        return Err(AppError::NotFound("User"));
    }

    let user = users(&state)
        .find_one(filter)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(Json(ProfileResponse::from(user)))
}

pub async fn leaderboard(State(state): State<AppState>) -> Result<Json<Vec<LeaderboardEntry>>> {
    let cursor = users(&state).find(doc! {}).await?;
    let mut all: Vec<User> = cursor.try_collect().await?;

    all.sort_by(|a, b| b.points.cmp(&a.points));

    let entries: Vec<LeaderboardEntry> = all
        .iter()
        .take(100)
        .map(|u| LeaderboardEntry {
            id: u.id.map(|id| id.to_hex()).unwrap_or_default(),
            display_name: u.display_name.clone(),
            photo_url: u.photo_url.clone(),
            points: u.points,
        })
        .collect();

    Ok(Json(entries))
}
