use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

/// Authenticated actor a request runs on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: usize,
}

pub fn issue_token(
    secret: &str,
    principal: &Principal,
    ttl: Duration,
) -> jsonwebtoken::errors::Result<String> {
    let claims = Claims {
        id: principal.id.clone(),
        role: principal.role.clone(),
        email: None,
        exp: (Utc::now() + ttl).timestamp().max(0) as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(secret: &str, token: &str) -> jsonwebtoken::errors::Result<Principal> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(Principal {
        id: data.claims.id,
        role: data.claims.role,
    })
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            tracing::warn!(path = %parts.uri.path(), "missing bearer token");
            return Err(AppError::Unauthorized);
        };

        match verify_token(&state.config.jwt_secret, token) {
            Ok(principal) => {
                tracing::debug!(
                    user_id = %principal.id,
                    role = principal.role.as_deref().unwrap_or("N/A"),
                    path = %parts.uri.path(),
                    "authenticated"
                );
                Ok(principal)
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %parts.uri.path(), "authentication failed");
                Err(AppError::Unauthorized)
            }
        }
    }
}
