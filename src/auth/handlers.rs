use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::auth::dto::{
    AuthResponse, LoginRequest, LogoutResponse, PublicUser, RefreshRequest, RegisterRequest,
};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::{CreateUserError, User};
use crate::auth::services::{AuthUser, JwtKeys};
use crate::clock;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/current_user", get(current_user))
}

fn token_pair(
    state: &AppState,
    user_id: i64,
) -> Result<(String, String), (StatusCode, String)> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user_id).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    let refresh_token = keys.sign_refresh(user_id).map_err(|e| {
        error!(error = %e, "jwt sign refresh failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok((access_token, refresh_token))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.username = payload.username.trim().to_string();
    payload.password = payload.password.trim().to_string();

    if payload.username.is_empty() || payload.password.is_empty() {
        warn!("signup missing username or password");
        return Err((
            StatusCode::BAD_REQUEST,
            "Username and password required".into(),
        ));
    }

    if payload.password.len() < 4 {
        warn!("password too short");
        return Err((
            StatusCode::BAD_REQUEST,
            "Password must be at least 4 characters".into(),
        ));
    }

    let hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "hash_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let user = match User::create(&state.db, &payload.username, &hash, &clock::now_stamp()).await {
        Ok(u) => u,
        Err(CreateUserError::UsernameTaken) => {
            warn!(username = %payload.username, "username already exists");
            return Err((StatusCode::BAD_REQUEST, "Username already exists".into()));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let (access_token, refresh_token) = token_pair(&state, user.id)?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            username: user.username,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.username = payload.username.trim().to_string();
    payload.password = payload.password.trim().to_string();

    if payload.username.is_empty() || payload.password.is_empty() {
        warn!("login missing username or password");
        return Err((
            StatusCode::BAD_REQUEST,
            "Username and password required".into(),
        ));
    }

    // Unknown username and wrong password answer identically.
    let user = match User::find_by_username(&state.db, &payload.username).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(username = %payload.username, "login unknown username");
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_username failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let ok = match verify_password(&payload.password, &user.password_hash) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "verify_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    if !ok {
        warn!(username = %payload.username, user_id = user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    let (access_token, refresh_token) = token_pair(&state, user.id)?;

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            username: user.username,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    let (access_token, refresh_token) = token_pair(&state, user.id)?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            username: user.username,
        },
    }))
}

/// Tokens are stateless; logout is an acknowledgement that the client is
/// discarding its pair.
#[instrument]
pub async fn logout(AuthUser(user_id): AuthUser) -> Json<LogoutResponse> {
    info!(user_id, "user logged out");
    Json(LogoutResponse { success: true })
}

#[instrument(skip(state))]
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "find_by_id failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    Ok(Json(PublicUser {
        id: user.id,
        username: user.username,
    }))
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn test_state() -> AppState {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("memory pool");
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .expect("migrations");
        let fake = AppState::fake();
        AppState::from_parts(db, fake.config.clone(), fake.resolver.clone(), fake.labeler.clone())
    }

    #[test]
    fn public_user_serialization() {
        let response = PublicUser {
            id: 3,
            username: "dana".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("dana"));
        assert!(json.contains("\"id\":3"));
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected_without_touching_the_original() {
        let state = test_state().await;

        let first = signup(
            State(state.clone()),
            Json(RegisterRequest {
                username: "casey".into(),
                password: "pass1234".into(),
            }),
        )
        .await
        .expect("first signup");
        let stored = User::find_by_username(&state.db, "casey")
            .await
            .unwrap()
            .expect("user persisted");

        let err = signup(
            State(state.clone()),
            Json(RegisterRequest {
                username: "casey".into(),
                password: "different".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(err.1, "Username already exists");

        let after = User::find_by_username(&state.db, "casey")
            .await
            .unwrap()
            .expect("user still present");
        assert_eq!(after.id, first.0.user.id);
        assert_eq!(after.password_hash, stored.password_hash);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let state = test_state().await;
        let hash = hash_password("open-sesame").expect("hash");
        User::create(&state.db, "casey", &hash, "2026-08-26 10:00:00")
            .await
            .expect("create user");

        let unknown_user = login(
            State(state.clone()),
            Json(LoginRequest {
                username: "nobody".into(),
                password: "open-sesame".into(),
            }),
        )
        .await
        .unwrap_err();
        let wrong_password = login(
            State(state.clone()),
            Json(LoginRequest {
                username: "casey".into(),
                password: "wrong".into(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(unknown_user, wrong_password);
        assert_eq!(unknown_user.0, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_user.1, "Invalid credentials");
    }
}
