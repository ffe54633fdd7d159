//! services/api/src/web/auth.rs
//!
//! Registration and login endpoints. Every request carries the plain
//! username/password pair; no session or token is issued.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tracing::{error, info};
use travel_planner_core::{domain::NewUser, PortError, UniqueKey};
use utoipa::ToSchema;

use crate::error::ServiceError;
use crate::web::{
    protocol::{lenient_bool, require_field, MessageResponse, Payload},
    state::AppState,
    users::ProfileResponse,
};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub nickname: Option<String>,
    pub birthyear: Option<i32>,
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    #[schema(value_type = Option<bool>)]
    pub marketing_consent: Option<bool>,
    pub preferences: Option<Vec<String>>,
    pub music_genres: Option<Vec<String>>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub user_info: ProfileResponse,
}

//=========================================================================================
// Password hashing
//=========================================================================================

/// Derives a salted one-way hash. The plaintext never leaves this function.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ServiceError::InternalError("Failed to hash password".to_string())
        })
}

/// Checks a candidate password against a stored PHC hash string.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ServiceError> {
    let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        ServiceError::InternalError("Authentication error".to_string())
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash checked when the username is unknown, so a miss costs as much as a
/// wrong password. Built with the same parameters as [`hash_password`].
static UNKNOWN_USER_HASH: OnceLock<String> = OnceLock::new();

fn unknown_user_hash() -> Result<&'static str, ServiceError> {
    if let Some(hash) = UNKNOWN_USER_HASH.get() {
        return Ok(hash.as_str());
    }
    let hash = hash_password("unknown-user-placeholder")?;
    Ok(UNKNOWN_USER_HASH.get_or_init(|| hash).as_str())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /register - Create a new user account
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = MessageResponse),
        (status = 400, description = "Missing fields, duplicate username or duplicate nickname", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    // 1. Every required field must be present before touching storage
    let username = require_field(req.username)?;
    let password = require_field(req.password)?;
    let nickname = require_field(req.nickname)?;
    let birthyear = req.birthyear.ok_or(ServiceError::MissingFields)?;
    let gender = require_field(req.gender)?;

    // 2. Uniqueness pre-checks; the storage constraints remain the backstop
    if state.db.username_exists(&username).await.map_err(ServiceError::internal)? {
        return Err(ServiceError::DuplicateUsername);
    }
    if state.db.nickname_exists(&nickname).await.map_err(ServiceError::internal)? {
        return Err(ServiceError::DuplicateNickname);
    }

    // 3. Hash and persist
    let new_user = NewUser {
        hashed_password: hash_password(&password)?,
        username,
        nickname,
        birthyear,
        gender,
        marketing_consent: req.marketing_consent.unwrap_or(false),
        preferences: req.preferences.unwrap_or_default(),
        music_genres: req.music_genres.unwrap_or_default(),
    };
    let username = new_user.username.clone();

    state.db.create_user(new_user).await.map_err(|e| match e {
        PortError::Conflict(UniqueKey::Username) => ServiceError::DuplicateUsername,
        PortError::Conflict(UniqueKey::Nickname) => ServiceError::DuplicateNickname,
        other => {
            error!("Failed to create user: {:?}", other);
            ServiceError::internal(other)
        }
    })?;

    info!("Registered user {}", username);
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

/// POST /login - Check a credential pair and return the profile
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in successfully", body = LoginResponse),
        (status = 401, description = "Invalid username or password", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (Some(username), Some(password)) = (req.username, req.password) else {
        return Err(ServiceError::InvalidCredentials);
    };

    // Unknown user and wrong password produce the same response.
    let creds = match state.db.get_user_credentials(&username).await {
        Ok(creds) => creds,
        Err(PortError::NotFound(_)) => {
            verify_password(&password, unknown_user_hash()?)?;
            return Err(ServiceError::InvalidCredentials);
        }
        Err(e) => {
            error!("Failed to get user: {:?}", e);
            return Err(ServiceError::internal(e));
        }
    };

    if !verify_password(&password, &creds.hashed_password)? {
        return Err(ServiceError::InvalidCredentials);
    }

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            message: "Logged in successfully".to_string(),
            user_info: ProfileResponse::from(creds.user),
        }),
    ))
}
