use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::User,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).delete(delete_me))
}

fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9@.+_-]{3,150}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn invalid_credentials() -> (StatusCode, String) {
    (StatusCode::UNAUTHORIZED, "Invalid credentials".into())
}

fn token_pair(state: &AppState, user_id: Uuid) -> Result<(String, String), (StatusCode, String)> {
    let keys = JwtKeys::from_ref(state);
    let access = keys.sign_access(user_id).map_err(internal)?;
    let refresh = keys.sign_refresh(user_id).map_err(internal)?;
    Ok((access, refresh))
}

fn auth_response(user: User, access_token: String, refresh_token: String) -> Json<AuthResponse> {
    Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            username: user.username,
        },
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.username = payload.username.trim().to_string();

    if !is_valid_username(&payload.username) {
        warn!(username = %payload.username, "invalid username");
        return Err((StatusCode::BAD_REQUEST, "Invalid username".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    match User::find_by_username(&state.db, &payload.username).await {
        Ok(Some(_)) => {
            warn!(username = %payload.username, "username already taken");
            return Err((StatusCode::CONFLICT, "Username already taken".into()));
        }
        Ok(None) => {}
        Err(e) => return Err(internal(e)),
    }

    let hash = hash_password(&payload.password).map_err(internal)?;
    let user = User::create(&state.db, &payload.username, &hash)
        .await
        .map_err(internal)?;

    let (access, refresh) = token_pair(&state, user.id)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(auth_response(user, access, refresh))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.username = payload.username.trim().to_string();

    let found = User::find_by_username(&state.db, &payload.username)
        .await
        .map_err(internal)?;
    let Some(user) = found else {
        warn!(username = %payload.username, "login for unknown username");
        return Err(invalid_credentials());
    };

    if !verify_password(&payload.password, &user.password_hash).map_err(internal)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(invalid_credentials());
    }

    let (access, refresh) = token_pair(&state, user.id)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(auth_response(user, access, refresh))
}

/// Exchanges a valid refresh token for a fresh access/refresh pair.
#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        (StatusCode::UNAUTHORIZED, e.to_string())
    })?;

    let found = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(internal)?;
    let Some(user) = found else {
        warn!(user_id = %claims.sub, "refresh for deleted user");
        return Err(invalid_credentials());
    };

    let (access, refresh) = token_pair(&state, user.id)?;
    Ok(auth_response(user, access, refresh))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let found = User::find_by_id(&state.db, user_id)
        .await
        .map_err(internal)?;
    let Some(user) = found else {
        warn!(user_id = %user_id, "token for deleted user");
        return Err(invalid_credentials());
    };

    Ok(Json(PublicUser {
        id: user.id,
        username: user.username,
    }))
}

/// DELETE /me removes the account; owned recipes cascade away.
#[instrument(skip(state))]
pub async fn delete_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = User::delete(&state.db, user_id).await.map_err(internal)?;
    if !deleted {
        warn!(user_id = %user_id, "delete for missing user");
        return Err(invalid_credentials());
    }

    info!(user_id = %user_id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rule_accepts_typical_names() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("bob.smith"));
        assert!(is_valid_username("chef_2024"));
        assert!(is_valid_username("kay@example"));
    }

    #[test]
    fn username_rule_rejects_bad_names() {
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username("semi;colon"));
        assert!(!is_valid_username(&"x".repeat(151)));
    }

    #[test]
    fn public_user_serialization() {
        let response = PublicUser {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("alice"));
        assert!(json.contains("id"));
    }
}
