use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::errors::AppError;
use crate::models::user::Claims;
use crate::state::AppState;

/// Bearer-token extractor: any handler taking `Claims` is an authenticated
/// route. The token is signed at login; its claims carry the role.
#[async_trait]
impl FromRequestParts<AppState> for Claims {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|header| header.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .ok_or(AppError::AuthError)?;

        let decoding_key = DecodingKey::from_secret(state.config.jwt_secret.as_ref());

        let token_data =
            decode::<Claims>(token, &decoding_key, &Validation::new(Algorithm::HS256))
                .map_err(|_| AppError::AuthError)?;

        Ok(token_data.claims)
    }
}

/// Server-side admin gate: the role is checked here, on the signed claims,
/// not left to client-side UI hiding.
pub struct AdminClaims(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AdminClaims {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let claims = Claims::from_request_parts(parts, state).await?;

        if !claims.is_admin {
            return Err(AppError::Forbidden);
        }

        Ok(AdminClaims(claims))
    }
}
