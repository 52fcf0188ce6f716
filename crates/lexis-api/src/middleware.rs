use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use lexis_types::api::Claims;

use crate::error::ApiError;
use crate::state::AppState;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

pub fn decode_claims(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

fn claims_from(headers: &HeaderMap, secret: &str) -> Result<Claims, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;
    decode_claims(secret, token).ok_or(ApiError::Unauthorized)
}

/// Extract and validate the JWT from the Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = claims_from(req.headers(), &state.jwt_secret)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Like `require_auth`, but only staff and moderators pass.
pub async fn require_staff(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = claims_from(req.headers(), &state.jwt_secret)?;
    if !claims.elevated {
        return Err(ApiError::Forbidden);
    }
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Caller of a public endpoint. Anonymous when no token is sent; a token
/// that is sent must be valid.
pub struct Viewer(pub Option<Claims>);

impl Viewer {
    pub fn elevated(&self) -> bool {
        self.0.as_ref().is_some_and(|c| c.elevated)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|c| c.sub)
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match bearer_token(&parts.headers) {
            None => Ok(Viewer(None)),
            Some(token) => decode_claims(&state.jwt_secret, token)
                .map(|claims| Viewer(Some(claims)))
                .ok_or(ApiError::Unauthorized),
        }
    }
}
