use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Collection;
use serde_json::json;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::middleware::auth::AdminClaims;
use crate::models::game::{CreateGame, Game, UpdateGame};
use crate::state::AppState;

pub async fn list_games(State(state): State<AppState>) -> Result<Json<Vec<Game>>> {
    let collection: Collection<Game> = state.db.collection("games");

    let cursor = collection.find(doc! {}).await?;
    let mut games: Vec<Game> = cursor.try_collect().await?;

    games.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(games))
}

pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Game>> {
    let collection: Collection<Game> = state.db.collection("games");
    let object_id = ObjectId::parse_str(&id)?;

    match collection.find_one(doc! { "_id": object_id }).await? {
        Some(game) => Ok(Json(game)),
        None => Err(AppError::NotFound("Game")),
    }
}

pub async fn create_game(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Json(payload): Json<CreateGame>,
) -> Result<Json<Game>> {
    payload.validate()?;

    let collection: Collection<Game> = state.db.collection("games");

    let now = Utc::now();
    let mut game = Game {
        id: None,
        name: payload.name,
        icon_url: payload.icon_url,
        banner_url: payload.banner_url,
        created_at: now,
        updated_at: now,
    };

    let insert_result = collection.insert_one(&game).await?;
    game.id = insert_result.inserted_id.as_object_id();

    tracing::info!("🎮 Created game: {}", game.name);

    Ok(Json(game))
}

pub async fn update_game(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(id): Path<String>,
    Json(payload): Json<UpdateGame>,
) -> Result<Json<Game>> {
    payload.validate()?;

    let collection: Collection<Game> = state.db.collection("games");
    let object_id = ObjectId::parse_str(&id)?;

    let mut update_doc = doc! {};
    if let Some(name) = &payload.name {
        update_doc.insert("name", name);
    }
    if let Some(icon_url) = &payload.icon_url {
        update_doc.insert("icon_url", icon_url);
    }
    if let Some(banner_url) = &payload.banner_url {
        update_doc.insert("banner_url", banner_url);
    }
    update_doc.insert(
        "updated_at",
        mongodb::bson::DateTime::from_chrono(Utc::now()),
    );

    let filter = doc! { "_id": object_id };
    let update_result = collection
        .update_one(filter.clone(), doc! { "$set": update_doc })
        .await?;

    if update_result.matched_count == 0 {
        return Err(AppError::NotFound("Game"));
    }

    // Tournaments keep their denormalized game_name/game_icon_url; a rename
    // here intentionally does not fan out to them.
    match collection.find_one(filter).await? {
        Some(game) => Ok(Json(game)),
        None => Err(AppError::NotFound("Game")),
    }
}

pub async fn delete_game(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let collection: Collection<Game> = state.db.collection("games");
    let object_id = ObjectId::parse_str(&id)?;

    let result = collection.delete_one(doc! { "_id": object_id }).await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Game"));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Game deleted",
    })))
}
