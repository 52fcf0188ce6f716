use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::info;

use lexis_types::api::{Claims, LoginRequest, RegisterRequest, TokenResponse};
use lexis_types::models::User;

use crate::error::{ApiError, ApiResult};
use crate::extract::Payload;
use crate::state::{AppState, with_db};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 32;
pub const MIN_PASSWORD_LEN: usize = 8;

pub async fn register(
    State(state): State<AppState>,
    Payload(req): Payload<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let username = req.username.trim().to_string();
    let name_len = username.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&name_len) {
        return Err(ApiError::BadRequest(format!(
            "Username must be {MIN_USERNAME_LEN} to {MAX_USERNAME_LEN} characters"
        )));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = hash_password(&req.password)?;
    let preferred = req.preferred_language.clone();
    let user = with_db(&state, move |db| {
        db.create_user(&username, &password_hash, preferred.as_deref())
    })
    .await?;

    info!("User {} registered", user.username);
    let token = create_token(&state.jwt_secret, &user, state.token_days)?;
    Ok((StatusCode::CREATED, Json(token_response(&user, token))))
}

pub async fn login(
    State(state): State<AppState>,
    Payload(req): Payload<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let username = req.username.trim().to_string();
    let row = with_db(&state, move |db| db.get_user_by_username(&username))
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let parsed_hash =
        PasswordHash::new(&row.password).map_err(|e| ApiError::Internal(e.to_string()))?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::InvalidCredentials)?;

    let token = create_token(&state.jwt_secret, &row.user, state.token_days)?;
    Ok(Json(token_response(&row.user, token)))
}

/// Argon2id hash in PHC string form.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// HS256 token carrying the user's id, name and elevation.
pub fn create_token(secret: &str, user: &User, days: i64) -> ApiResult<String> {
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        elevated: user.is_elevated(),
        exp: (chrono::Utc::now() + chrono::Duration::days(days)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.to_string()))
}

fn token_response(user: &User, token: String) -> TokenResponse {
    TokenResponse {
        user_id: user.id,
        username: user.username.clone(),
        elevated: user.is_elevated(),
        token,
    }
}
