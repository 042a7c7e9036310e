use axum::{extract::State, response::Json};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use mongodb::bson::doc;
use mongodb::Collection;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::user::{AuthResponse, Claims, LoginUser, RegisterUser, User, UserResponse};
use crate::state::AppState;

const TOKEN_TTL_SECS: i64 = 86400; // 24 hours

fn issue_token(user: &User, user_id: &str, secret: &str) -> Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        email: user.email.clone(),
        name: user.display_name.clone(),
        is_admin: user.is_admin,
        exp: (Utc::now().timestamp() + TOKEN_TTL_SECS) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| AppError::ConfigurationError(format!("failed to sign token: {e}")))
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUser>,
) -> Result<Json<AuthResponse>> {
    payload.validate()?;

    let collection: Collection<User> = state.db.collection("users");

    let email = payload.email.trim().to_lowercase();

    let existing = collection.find_one(doc! { "email": &email }).await?;
    if existing.is_some() {
        return Err(AppError::DuplicateKey(format!(
            "an account with email {email} already exists"
        )));
    }

    let password_hash = hash(&payload.password, DEFAULT_COST)
        .map_err(|e| AppError::ConfigurationError(format!("bcrypt failure: {e}")))?;

    // Bootstrap rule: the configured admin email is seeded with the admin
    // role on first registration.
    let is_admin = !state.config.admin_email.is_empty()
        && email.eq_ignore_ascii_case(&state.config.admin_email);

    let now = Utc::now();
    let user = User {
        id: None,
        email,
        display_name: payload.display_name.trim().to_string(),
        password_hash,
        photo_url: None,
        is_admin,
        bio: None,
        favorite_game_ids: Vec::new(),
        streaming_channel_url: None,
        friend_uids: Vec::new(),
        team_id: None,
        points: 0,
        created_at: now,
        updated_at: now,
    };

    let insert_result = collection.insert_one(&user).await?;
    let user_id = insert_result
        .inserted_id
        .as_object_id()
        .ok_or_else(|| AppError::ConfigurationError("insert returned no ObjectId".to_string()))?
        .to_hex();

    tracing::info!("👤 Registered new user: {} (admin: {})", user.email, is_admin);

    let token = issue_token(&user, &user_id, &state.config.jwt_secret)?;

    Ok(Json(AuthResponse {
        user: UserResponse {
            id: user_id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            photo_url: None,
            is_admin,
            points: 0,
        },
        token,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginUser>,
) -> Result<Json<AuthResponse>> {
    let collection: Collection<User> = state.db.collection("users");

    let email = payload.email.trim().to_lowercase();

    let user = collection
        .find_one(doc! { "email": &email })
        .await?
        .ok_or(AppError::AuthError)?;

    let valid = verify(&payload.password, &user.password_hash).map_err(|_| AppError::AuthError)?;
    if !valid {
        return Err(AppError::AuthError);
    }

    let user_id = user.id.map(|id| id.to_hex()).unwrap_or_default();
    let token = issue_token(&user, &user_id, &state.config.jwt_secret)?;

    tracing::info!("🔑 User logged in: {}", user.email);

    Ok(Json(AuthResponse {
        user: UserResponse::from(&user),
        token,
    }))
}
