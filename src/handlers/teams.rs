use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId, Bson};
use mongodb::{ClientSession, Collection};
use serde_json::json;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::team::{AddMember, CreateTeam, RemovalPlan, Team};
use crate::models::user::{Claims, User};
use crate::state::AppState;

fn teams(state: &AppState) -> Collection<Team> {
    state.db.collection("teams")
}

fn users(state: &AppState) -> Collection<User> {
    state.db.collection("users")
}

async fn fetch_team(state: &AppState, id: &str) -> Result<(ObjectId, Team)> {
    let object_id = ObjectId::parse_str(id)?;
    let team = teams(state)
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or(AppError::NotFound("Team"))?;
    Ok((object_id, team))
}

/// Commit on success, abort on failure. Team membership is the one place
/// where a single logical operation touches two documents, so the writes
/// run inside a session transaction and never diverge.
async fn finish_transaction(
    mut session: ClientSession,
    outcome: mongodb::error::Result<()>,
) -> Result<()> {
    match outcome {
        Ok(()) => {
            session.commit_transaction().await?;
            Ok(())
        }
        Err(e) => {
            let _ = session.abort_transaction().await;
            Err(e.into())
        }
    }
}

pub async fn create_team(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<CreateTeam>,
) -> Result<Json<Team>> {
    payload.validate()?;

    // One team led per user
    let already_leading = teams(&state)
        .find_one(doc! { "leader_uid": &claims.sub })
        .await?;
    Team::check_create(already_leading.as_ref())?;

    let leader_oid = ObjectId::parse_str(&claims.sub)?;
    let team_id = ObjectId::new();
    let now = Utc::now();
    let team = Team {
        id: Some(team_id),
        name: payload.name,
        leader_uid: claims.sub.clone(),
        leader_name: claims.name.clone(),
        member_uids: vec![claims.sub.clone()],
        created_at: now,
        last_activity_at: now,
    };

    let mut session = state.client.start_session().await?;
    session.start_transaction().await?;

    let outcome: mongodb::error::Result<()> = async {
        teams(&state)
            .insert_one(&team)
            .session(&mut session)
            .await?;
        users(&state)
            .update_one(
                doc! { "_id": leader_oid },
                doc! { "$set": { "team_id": team_id.to_hex() } },
            )
            .session(&mut session)
            .await?;
        Ok(())
    }
    .await;

    finish_transaction(session, outcome).await?;

    tracing::info!("👥 Team '{}' created by {}", team.name, claims.name);

    Ok(Json(team))
}

pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Team>> {
    let (_, team) = fetch_team(&state, &id).await?;
    Ok(Json(team))
}

pub async fn add_member(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
    Json(payload): Json<AddMember>,
) -> Result<Json<serde_json::Value>> {
    let (team_oid, team) = fetch_team(&state, &id).await?;

    if team.leader_uid != claims.sub {
        return Err(AppError::Forbidden);
    }
    if team.is_member(&payload.uid) {
        return Err(AppError::DuplicateKey(
            "User is already on this team".to_string(),
        ));
    }

    let member_oid = ObjectId::parse_str(&payload.uid)?;
    let member = users(&state)
        .find_one(doc! { "_id": member_oid })
        .await?
        .ok_or(AppError::NotFound("User"))?;
    if member.team_id.is_some() {
        return Err(AppError::invalid_data("User already belongs to a team"));
    }

    let mut session = state.client.start_session().await?;
    session.start_transaction().await?;

    let outcome: mongodb::error::Result<()> = async {
        teams(&state)
            .update_one(
                doc! { "_id": team_oid },
                doc! {
                    "$addToSet": { "member_uids": &payload.uid },
                    "$set": { "last_activity_at": mongodb::bson::DateTime::from_chrono(Utc::now()) },
                },
            )
            .session(&mut session)
            .await?;
        users(&state)
            .update_one(
                doc! { "_id": member_oid },
                doc! { "$set": { "team_id": team_oid.to_hex() } },
            )
            .session(&mut session)
            .await?;
        Ok(())
    }
    .await;

    finish_transaction(session, outcome).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Member added",
    })))
}

pub async fn remove_member(
    State(state): State<AppState>,
    claims: Claims,
    Path((id, uid)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>> {
    let (team_oid, team) = fetch_team(&state, &id).await?;

    // The leader manages the roster; a member may remove themselves.
    if team.leader_uid != claims.sub && uid != claims.sub {
        return Err(AppError::Forbidden);
    }

    let plan = team
        .plan_removal(&uid)
        .ok_or(AppError::NotFound("Team member"))?;

    let member_oid = ObjectId::parse_str(&uid)?;

    let mut session = state.client.start_session().await?;
    session.start_transaction().await?;

    let outcome: mongodb::error::Result<()> = async {
        match plan {
            RemovalPlan::DetachMember => {
                teams(&state)
                    .update_one(
                        doc! { "_id": team_oid },
                        doc! {
                            "$pull": { "member_uids": &uid },
                            "$set": { "last_activity_at": mongodb::bson::DateTime::from_chrono(Utc::now()) },
                        },
                    )
                    .session(&mut session)
                    .await?;
            }
            RemovalPlan::DeleteTeam => {
                teams(&state)
                    .delete_one(doc! { "_id": team_oid })
                    .session(&mut session)
                    .await?;
            }
        }
        users(&state)
            .update_one(
                doc! { "_id": member_oid },
                doc! { "$set": { "team_id": Bson::Null } },
            )
            .session(&mut session)
            .await?;
        Ok(())
    }
    .await;

    finish_transaction(session, outcome).await?;

    let deleted = plan == RemovalPlan::DeleteTeam;
    if deleted {
        tracing::info!("👥 Team '{}' dissolved with its last member", team.name);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Member removed",
        "team_deleted": deleted,
    })))
}

pub async fn delete_team(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let (team_oid, team) = fetch_team(&state, &id).await?;

    if team.leader_uid != claims.sub {
        return Err(AppError::Forbidden);
    }

    let member_oids: Vec<ObjectId> = team
        .member_uids
        .iter()
        .filter_map(|uid| ObjectId::parse_str(uid).ok())
        .collect();

    let mut session = state.client.start_session().await?;
    session.start_transaction().await?;

    let outcome: mongodb::error::Result<()> = async {
        teams(&state)
            .delete_one(doc! { "_id": team_oid })
            .session(&mut session)
            .await?;
        users(&state)
            .update_many(
                doc! { "_id": { "$in": member_oids } },
                doc! { "$set": { "team_id": Bson::Null } },
            )
            .session(&mut session)
            .await?;
        Ok(())
    }
    .await;

    finish_transaction(session, outcome).await?;

    tracing::info!("👥 Team '{}' deleted by its leader", team.name);

    Ok(Json(json!({
        "success": true,
        "message": "Team deleted",
    })))
}
