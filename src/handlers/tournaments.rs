use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, Document};
use mongodb::Collection;
use serde_json::json;
use validator::Validate;

use crate::errors::{AppError, RegistrationError, Result};
use crate::models::bracket::{bracket_view, Match};
use crate::models::game::Game;
use crate::models::tournament::{
    select_featured, CreateTournament, JoinTournament, Participant, SetFeatured, Tournament,
    TournamentQuery, TournamentStatus, UpdateRoomDetails, UpdateStatus,
};
use crate::middleware::auth::AdminClaims;
use crate::models::user::{Claims, User};
use crate::state::AppState;

fn tournaments(state: &AppState) -> Collection<Tournament> {
    state.db.collection("tournaments")
}

async fn fetch_tournament(state: &AppState, id: &str) -> Result<(ObjectId, Tournament)> {
    let object_id = ObjectId::parse_str(id)?;
    let tournament = tournaments(state)
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or(AppError::NotFound("Tournament"))?;
    Ok((object_id, tournament))
}

/// Organizer or admin; everything gated here is a direct field update, the
/// store itself does not check ownership.
fn require_organizer_or_admin(tournament: &Tournament, claims: &Claims) -> Result<()> {
    if claims.is_admin || tournament.organizer_id == claims.sub {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub async fn list_tournaments(
    State(state): State<AppState>,
    Query(query): Query<TournamentQuery>,
) -> Result<Json<Vec<Tournament>>> {
    let mut filter = doc! {};

    if let Some(status) = &query.status {
        let status = TournamentStatus::parse(status)
            .ok_or_else(|| AppError::invalid_data(format!("Unknown status '{status}'")))?;
        filter.insert("status", status.as_str());
    }
    if let Some(game_id) = &query.game_id {
        filter.insert("game_id", game_id);
    }
    if let Some(participant_id) = &query.participant_id {
        filter.insert("participants.id", participant_id);
    }
    if let Some(featured) = query.featured {
        filter.insert("featured", featured);
    }

    let cursor = tournaments(&state).find(filter).await?;
    let mut list: Vec<Tournament> = cursor.try_collect().await?;

    // Newest start first
    list.sort_by(|a, b| b.start_date.cmp(&a.start_date));

    Ok(Json(list))
}

pub async fn featured_tournament(State(state): State<AppState>) -> Result<Json<Tournament>> {
    let cursor = tournaments(&state).find(doc! {}).await?;
    let all: Vec<Tournament> = cursor.try_collect().await?;

    match select_featured(&all) {
        Some(t) => Ok(Json(t.clone())),
        None => Err(AppError::NotFound("Tournament")),
    }
}

pub async fn get_tournament(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Tournament>> {
    let (_, tournament) = fetch_tournament(&state, &id).await?;
    Ok(Json(tournament))
}

pub async fn get_bracket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BTreeMap<u32, Vec<Match>>>> {
    let (_, tournament) = fetch_tournament(&state, &id).await?;
    Ok(Json(bracket_view(&tournament)))
}

pub async fn create_tournament(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<CreateTournament>,
) -> Result<Json<Tournament>> {
    payload.validate()?;

    // Denormalize the game's name and icon into the tournament document.
    // These are copied once and never re-synced with the game.
    let games: Collection<Game> = state.db.collection("games");
    let game_oid = ObjectId::parse_str(&payload.game_id)?;
    let game = games
        .find_one(doc! { "_id": game_oid })
        .await?
        .ok_or(AppError::NotFound("Game"))?;

    let now = Utc::now();
    let mut tournament = Tournament {
        id: None,
        name: payload.name,
        game_id: payload.game_id,
        game_name: game.name,
        game_icon_url: game.icon_url,
        banner_image_url: payload.banner_image_url,
        description: payload.description,
        status: TournamentStatus::Upcoming,
        start_date: payload.start_date,
        end_date: payload.end_date,
        participants: Vec::new(),
        max_participants: payload.max_participants,
        prize_pool: payload.prize_pool,
        rules: payload.rules,
        bracket_type: payload.bracket_type,
        matches: Vec::new(),
        featured: false,
        organizer_id: claims.sub.clone(),
        organizer: claims.name.clone(),
        entry_fee: payload.entry_fee,
        currency: payload.currency,
        room_code: None,
        room_password: None,
        sponsor_name: payload.sponsor_name,
        sponsor_logo_url: payload.sponsor_logo_url,
        registration_instructions: payload.registration_instructions,
        created_at: now,
        updated_at: now,
    };

    let insert_result = tournaments(&state).insert_one(&tournament).await?;
    tournament.id = insert_result.inserted_id.as_object_id();

    tracing::info!(
        "🏆 Tournament '{}' created by {} ({})",
        tournament.name,
        claims.name,
        claims.sub
    );

    Ok(Json(tournament))
}

pub async fn join_tournament(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
    Json(payload): Json<JoinTournament>,
) -> Result<Json<serde_json::Value>> {
    payload.validate()?;

    let (object_id, tournament) = fetch_tournament(&state, &id).await?;

    tournament.check_join(&claims.sub)?;

    // The roster snapshot takes the avatar from the caller's profile.
    let users: Collection<User> = state.db.collection("users");
    let caller = users
        .find_one(doc! { "_id": ObjectId::parse_str(&claims.sub)? })
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let participant =
        Participant::from_profile(&claims.sub, &claims.name, caller.photo_url, payload);

    // Guarded conditional push: the filter re-asserts the join preconditions
    // so two concurrent joins cannot overshoot the cap or double-register.
    // The roster is an embedded array, so "slot max-1 does not exist" is the
    // capacity assertion.
    let mut filter = doc! {
        "_id": object_id,
        "participants.id": { "$ne": &claims.sub },
        "status": { "$in": ["Upcoming", "Live"] },
    };
    if tournament.status == TournamentStatus::Upcoming {
        let last_slot = tournament.max_participants.saturating_sub(1);
        filter.insert(
            format!("participants.{last_slot}"),
            doc! { "$exists": false },
        );
    }

    let update = doc! {
        "$push": { "participants": to_bson(&participant)? },
        "$set": { "updated_at": mongodb::bson::DateTime::from_chrono(Utc::now()) },
    };

    let result = tournaments(&state).update_one(filter, update).await?;

    if result.modified_count == 0 {
        // Lost the race; re-read to report the precise reason.
        let fresh = tournaments(&state)
            .find_one(doc! { "_id": object_id })
            .await?
            .ok_or(AppError::NotFound("Tournament"))?;
        return match fresh.check_join(&claims.sub) {
            Err(reason) => Err(reason.into()),
            Ok(()) => Err(RegistrationError::Full.into()),
        };
    }

    tracing::info!(
        "✅ {} registered for tournament '{}'",
        claims.name,
        tournament.name
    );

    Ok(Json(json!({
        "success": true,
        "message": "Registered successfully",
        "tournament_id": id,
    })))
}

pub async fn update_status(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatus>,
) -> Result<Json<serde_json::Value>> {
    let (object_id, tournament) = fetch_tournament(&state, &id).await?;
    require_organizer_or_admin(&tournament, &claims)?;

    // Value membership is validated; the transition graph deliberately is
    // not (admin actions may set any status).
    let status = TournamentStatus::parse(&payload.status)
        .ok_or_else(|| AppError::invalid_data(format!("Unknown status '{}'", payload.status)))?;

    let mut set = doc! {
        "status": status.as_str(),
        "updated_at": mongodb::bson::DateTime::from_chrono(Utc::now()),
    };
    if status == TournamentStatus::Completed {
        set.insert("end_date", mongodb::bson::DateTime::from_chrono(Utc::now()));
    }

    tournaments(&state)
        .update_one(doc! { "_id": object_id }, doc! { "$set": set })
        .await?;

    tracing::info!("📋 Tournament '{}' status set to {}", tournament.name, status);

    Ok(Json(json!({
        "success": true,
        "status": status.as_str(),
    })))
}

pub async fn set_featured(
    State(state): State<AppState>,
    _admin: AdminClaims,
    Path(id): Path<String>,
    Json(payload): Json<SetFeatured>,
) -> Result<Json<serde_json::Value>> {
    let object_id = ObjectId::parse_str(&id)?;

    let result = tournaments(&state)
        .update_one(
            doc! { "_id": object_id },
            doc! { "$set": {
                "featured": payload.featured,
                "updated_at": mongodb::bson::DateTime::from_chrono(Utc::now()),
            } },
        )
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::NotFound("Tournament"));
    }

    Ok(Json(json!({
        "success": true,
        "featured": payload.featured,
    })))
}

pub async fn update_room_details(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRoomDetails>,
) -> Result<Json<serde_json::Value>> {
    let (object_id, tournament) = fetch_tournament(&state, &id).await?;
    require_organizer_or_admin(&tournament, &claims)?;

    if !tournament.room_details_unlocked(Utc::now()) {
        return Err(AppError::invalid_data(
            "Room details can be set no earlier than 15 minutes before the start",
        ));
    }

    let mut set: Document = doc! {
        "room_code": &payload.room_code,
        "updated_at": mongodb::bson::DateTime::from_chrono(Utc::now()),
    };
    if let Some(password) = &payload.room_password {
        set.insert("room_password", password);
    }

    tournaments(&state)
        .update_one(doc! { "_id": object_id }, doc! { "$set": set })
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Room details updated",
    })))
}

pub async fn delete_tournament(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let (object_id, tournament) = fetch_tournament(&state, &id).await?;
    require_organizer_or_admin(&tournament, &claims)?;

    tournaments(&state)
        .delete_one(doc! { "_id": object_id })
        .await?;

    tracing::info!("🗑️ Tournament '{}' deleted by {}", tournament.name, claims.sub);

    Ok(Json(json!({
        "success": true,
        "message": "Tournament deleted",
    })))
}
