//! services/api/src/web/photos.rs
//!
//! Photo metadata. The image itself lives wherever `photo_uri` points.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use travel_planner_core::{
    codec::{format_instant, parse_instant},
    domain::{NewPhoto, Photo},
    PortError,
};
use utoipa::ToSchema;

use crate::error::ServiceError;
use crate::web::{
    protocol::{require_field, CreatedResponse, MessageResponse, Payload, UsernameQuery},
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct CreatePhotoRequest {
    pub username: Option<String>,
    #[serde(alias = "photoUri")]
    pub photo_uri: Option<String>,
    pub location: Option<String>,
    /// `YYYY-MM-DDTHH:MM:SSZ`, fractional seconds accepted.
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PhotoResponse {
    pub id: i64,
    pub user_id: i64,
    pub photo_uri: String,
    pub location: Option<String>,
    pub timestamp: String,
}

impl From<Photo> for PhotoResponse {
    fn from(p: Photo) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            photo_uri: p.photo_uri,
            location: p.location,
            timestamp: format_instant(&p.timestamp),
        }
    }
}

fn user_lookup_error(e: PortError) -> ServiceError {
    match e {
        PortError::NotFound(_) => ServiceError::UserNotFound,
        other => ServiceError::internal(other),
    }
}

/// POST /photos - Record a captured photo
#[utoipa::path(
    post,
    path = "/photos",
    request_body = CreatePhotoRequest,
    responses(
        (status = 201, description = "Photo saved", body = CreatedResponse),
        (status = 400, description = "Missing field or malformed timestamp", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    )
)]
pub async fn create_photo_handler(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<CreatePhotoRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let username = require_field(req.username)?;
    let photo_uri = require_field(req.photo_uri)?;
    let raw_timestamp = require_field(req.timestamp)?;

    let user = state
        .db
        .get_user_by_username(&username)
        .await
        .map_err(user_lookup_error)?;
    let timestamp =
        parse_instant(&raw_timestamp).map_err(|e| ServiceError::BadRequest(e.to_string()))?;

    let id = state
        .db
        .create_photo(NewPhoto {
            user_id: user.id,
            photo_uri,
            location: req.location,
            timestamp,
        })
        .await
        .map_err(|e| {
            error!("Failed to store photo for {}: {:?}", username, e);
            ServiceError::internal(e)
        })?;

    info!("Stored photo {} for {}", id, username);
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Photo saved successfully".to_string(),
            id,
        }),
    ))
}

/// GET /photos?username= - List a user's photos
#[utoipa::path(
    get,
    path = "/photos",
    params(UsernameQuery),
    responses(
        (status = 200, description = "All photos of the user", body = [PhotoResponse]),
        (status = 400, description = "Missing username", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    )
)]
pub async fn list_photos_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UsernameQuery>,
) -> Result<Json<Vec<PhotoResponse>>, ServiceError> {
    let username = query.require()?;
    let user = state
        .db
        .get_user_by_username(&username)
        .await
        .map_err(user_lookup_error)?;

    let photos = state
        .db
        .list_photos_for_user(user.id)
        .await
        .map_err(ServiceError::internal)?;
    Ok(Json(photos.into_iter().map(PhotoResponse::from).collect()))
}
