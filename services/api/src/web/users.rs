//! services/api/src/web/users.rs
//!
//! Profile read and partial update.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use travel_planner_core::{domain::ProfileUpdate, validation::is_blank, PortError, UniqueKey, User};
use utoipa::ToSchema;

use crate::error::ServiceError;
use crate::web::{
    protocol::{lenient_bool, MessageResponse, Payload},
    state::AppState,
};

/// The decoded profile returned by login and profile reads.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub username: String,
    pub nickname: String,
    pub birthyear: i32,
    pub gender: String,
    pub marketing_consent: bool,
    pub preferences: Vec<String>,
    pub music_genres: Vec<String>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            nickname: user.nickname,
            birthyear: user.birthyear,
            gender: user.gender,
            marketing_consent: user.marketing_consent,
            preferences: user.preferences,
            music_genres: user.music_genres,
        }
    }
}

/// Only the fields present in the body are applied.
#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub nickname: Option<String>,
    pub birthyear: Option<i32>,
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    #[schema(value_type = Option<bool>)]
    pub marketing_consent: Option<bool>,
    pub preferences: Option<Vec<String>>,
    pub music_genres: Option<Vec<String>>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            nickname: req.nickname,
            birthyear: req.birthyear,
            gender: req.gender,
            marketing_consent: req.marketing_consent,
            preferences: req.preferences,
            music_genres: req.music_genres,
        }
    }
}

fn lookup_error(e: PortError) -> ServiceError {
    match e {
        PortError::NotFound(_) => ServiceError::UserNotFound,
        other => {
            error!("Failed to load user: {:?}", other);
            ServiceError::internal(other)
        }
    }
}

/// GET /user/{username} - Read a profile
#[utoipa::path(
    get,
    path = "/user/{username}",
    params(("username" = String, Path, description = "The user's login name.")),
    responses(
        (status = 200, description = "The decoded profile", body = ProfileResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    )
)]
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, ServiceError> {
    let user = state.db.get_user_by_username(&username).await.map_err(lookup_error)?;
    Ok(Json(ProfileResponse::from(user)))
}

/// PUT /user/{username} - Partially update a profile
#[utoipa::path(
    put,
    path = "/user/{username}",
    params(("username" = String, Path, description = "The user's login name.")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "User updated successfully", body = MessageResponse),
        (status = 400, description = "Duplicate nickname or blank field", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    )
)]
pub async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Payload(req): Payload<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let current = state.db.get_user_by_username(&username).await.map_err(lookup_error)?;
    let update = ProfileUpdate::from(req);

    // Required profile fields may be changed but never blanked.
    if update.nickname.as_deref().is_some_and(|n| is_blank(Some(n)))
        || update.gender.as_deref().is_some_and(|g| is_blank(Some(g)))
    {
        return Err(ServiceError::MissingFields);
    }

    if let Some(nickname) = update.nickname.as_deref() {
        if nickname != current.nickname
            && state.db.nickname_exists(nickname).await.map_err(ServiceError::internal)?
        {
            return Err(ServiceError::DuplicateNickname);
        }
    }

    if !update.is_empty() {
        state
            .db
            .update_user_profile(&username, update)
            .await
            .map_err(|e| match e {
                PortError::Conflict(UniqueKey::Nickname) => ServiceError::DuplicateNickname,
                other => lookup_error(other),
            })?;
        info!("Updated profile of {}", username);
    }

    Ok(Json(MessageResponse::new("User updated successfully")))
}
