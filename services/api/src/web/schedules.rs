//! services/api/src/web/schedules.rs
//!
//! Travel schedule endpoints. The primary and the additional schedule tables
//! expose the same create/list/read/delete contract; each route is a thin
//! wrapper selecting a [`ScheduleKind`].
//!
//! Schedules are addressed by their client-supplied `tripId` and are only
//! visible to the user that owns them.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};
use travel_planner_core::{
    codec::{format_date, format_instant, parse_date, parse_instant, CodecError},
    domain::{NewSchedule, ScheduleKind, TravelSchedule},
    PortError, UniqueKey,
};
use utoipa::ToSchema;

use crate::error::ServiceError;
use crate::web::{
    protocol::{require_field, require_named, CreatedResponse, MessageResponse, Payload, UsernameQuery},
    state::AppState,
};

const DUPLICATE_TRIP_ID: &str = "Trip ID already exists";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    /// Owner of the new schedule.
    pub username: Option<String>,
    pub trip_id: Option<String>,
    /// `YYYY-MM-DDTHH:MM:SSZ`, fractional seconds accepted.
    pub timestamp: Option<String>,
    pub title: Option<String>,
    pub companion: Option<String>,
    /// `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`
    pub end_date: Option<String>,
    pub duration: Option<String>,
    pub budget: Option<String>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub transportation: Option<Vec<Value>>,
    pub keywords: Option<Vec<String>>,
    pub summary: Option<String>,
    /// The itinerary itself; any JSON structure.
    #[schema(value_type = Object)]
    pub days: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub extra_info: Option<Map<String, Value>>,
    pub generated_schedule_raw: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub id: i64,
    pub username: String,
    pub trip_id: String,
    pub timestamp: String,
    pub title: String,
    pub companion: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub duration: String,
    pub budget: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub transportation: Vec<Value>,
    pub keywords: Vec<String>,
    pub summary: Option<String>,
    #[schema(value_type = Object)]
    pub days: Value,
    #[schema(value_type = Object)]
    pub extra_info: Map<String, Value>,
    pub generated_schedule_raw: Option<String>,
}

impl From<TravelSchedule> for ScheduleResponse {
    fn from(s: TravelSchedule) -> Self {
        Self {
            id: s.id,
            username: s.owner,
            trip_id: s.trip_id,
            timestamp: format_instant(&s.timestamp),
            title: s.title,
            companion: s.companion,
            start_date: format_date(&s.start_date),
            end_date: format_date(&s.end_date),
            duration: s.duration,
            budget: s.budget,
            transportation: s.transportation,
            keywords: s.keywords,
            summary: s.summary,
            days: s.days,
            extra_info: s.extra_info,
            generated_schedule_raw: s.generated_schedule_raw,
        }
    }
}

impl CreateScheduleRequest {
    /// Checks presence and formats of every field and builds the insert.
    fn into_new_schedule(self, user_id: i64) -> Result<NewSchedule, ServiceError> {
        let bad_request = |e: CodecError| ServiceError::BadRequest(e.to_string());

        let trip_id = require_named(self.trip_id.filter(|t| !t.trim().is_empty()), "tripId")?;
        let timestamp = parse_instant(&require_named(self.timestamp, "timestamp")?).map_err(bad_request)?;
        let title = require_named(self.title, "title")?;
        let start_date = parse_date(&require_named(self.start_date, "startDate")?).map_err(bad_request)?;
        let end_date = parse_date(&require_named(self.end_date, "endDate")?).map_err(bad_request)?;
        let duration = require_named(self.duration, "duration")?;
        let days = require_named(self.days, "days")?;

        Ok(NewSchedule {
            user_id,
            trip_id,
            timestamp,
            title,
            companion: self.companion,
            start_date,
            end_date,
            duration,
            budget: self.budget,
            transportation: self.transportation.unwrap_or_default(),
            keywords: self.keywords.unwrap_or_default(),
            summary: self.summary,
            days,
            extra_info: self.extra_info.unwrap_or_default(),
            generated_schedule_raw: self.generated_schedule_raw,
        })
    }
}

//=========================================================================================
// Shared implementation
//=========================================================================================

async fn create_schedule(
    state: &AppState,
    kind: ScheduleKind,
    req: CreateScheduleRequest,
) -> Result<(StatusCode, Json<CreatedResponse>), ServiceError> {
    let username = require_field(req.username.clone())?;
    let user = state.db.get_user_by_username(&username).await.map_err(|e| match e {
        PortError::NotFound(_) => ServiceError::UserNotFound,
        other => ServiceError::BadRequest(other.to_string()),
    })?;

    let schedule = req.into_new_schedule(user.id)?;

    if state
        .db
        .trip_id_exists(kind, &schedule.trip_id)
        .await
        .map_err(|e| ServiceError::BadRequest(e.to_string()))?
    {
        return Err(ServiceError::BadRequest(DUPLICATE_TRIP_ID.to_string()));
    }

    let trip_id = schedule.trip_id.clone();
    let id = state.db.create_schedule(kind, schedule).await.map_err(|e| match e {
        PortError::Conflict(UniqueKey::TripId) => ServiceError::BadRequest(DUPLICATE_TRIP_ID.to_string()),
        other => {
            error!("Failed to create {}: {:?}", kind.table_name(), other);
            ServiceError::BadRequest(other.to_string())
        }
    })?;

    info!("Created {} {} for {}", kind.table_name(), trip_id, username);
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: format!("{} created successfully", kind.label()),
            id,
        }),
    ))
}

async fn list_schedules(
    state: &AppState,
    kind: ScheduleKind,
    query: UsernameQuery,
) -> Result<Json<Vec<ScheduleResponse>>, ServiceError> {
    let username = query.require()?;
    let user = state.db.get_user_by_username(&username).await.map_err(|e| match e {
        PortError::NotFound(_) => ServiceError::UserNotFound,
        other => ServiceError::internal(other),
    })?;

    let schedules = state
        .db
        .list_schedules_for_user(kind, user.id)
        .await
        .map_err(|e| {
            error!("Failed to list {}: {:?}", kind.table_name(), e);
            ServiceError::internal(e)
        })?;

    Ok(Json(schedules.into_iter().map(ScheduleResponse::from).collect()))
}

/// Loads a schedule and checks that `username` owns it.
async fn load_owned_schedule(
    state: &AppState,
    kind: ScheduleKind,
    trip_id: &str,
    query: UsernameQuery,
) -> Result<TravelSchedule, ServiceError> {
    let username = query.require()?;
    let schedule = state
        .db
        .get_schedule_by_trip_id(kind, trip_id)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => ServiceError::ScheduleNotFound(kind.label()),
            other => ServiceError::internal(other),
        })?;

    if schedule.owner != username {
        warn!("{} tried to access {} owned by another user", username, trip_id);
        return Err(ServiceError::Unauthorized);
    }
    Ok(schedule)
}

async fn get_schedule(
    state: &AppState,
    kind: ScheduleKind,
    trip_id: &str,
    query: UsernameQuery,
) -> Result<Json<ScheduleResponse>, ServiceError> {
    let schedule = load_owned_schedule(state, kind, trip_id, query).await?;
    Ok(Json(ScheduleResponse::from(schedule)))
}

async fn delete_schedule(
    state: &AppState,
    kind: ScheduleKind,
    trip_id: &str,
    query: UsernameQuery,
) -> Result<Json<MessageResponse>, ServiceError> {
    load_owned_schedule(state, kind, trip_id, query).await?;

    state.db.delete_schedule(kind, trip_id).await.map_err(|e| match e {
        PortError::NotFound(_) => ServiceError::ScheduleNotFound(kind.label()),
        other => {
            error!("Failed to delete {} {}: {:?}", kind.table_name(), trip_id, other);
            ServiceError::InternalError(other.to_string())
        }
    })?;

    info!("Deleted {} {}", kind.table_name(), trip_id);
    Ok(Json(MessageResponse::new(format!("{} deleted successfully", kind.label()))))
}

//=========================================================================================
// Handlers: /schedule
//=========================================================================================

/// POST /schedule - Create a travel schedule
#[utoipa::path(
    post,
    path = "/schedule",
    request_body = CreateScheduleRequest,
    responses(
        (status = 201, description = "Schedule created", body = CreatedResponse),
        (status = 400, description = "Missing, malformed or duplicate field", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    )
)]
pub async fn create_schedule_handler(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<CreateScheduleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    create_schedule(&state, ScheduleKind::Primary, req).await
}

/// GET /schedule?username= - List a user's schedules
#[utoipa::path(
    get,
    path = "/schedule",
    params(UsernameQuery),
    responses(
        (status = 200, description = "All schedules of the user", body = [ScheduleResponse]),
        (status = 400, description = "Missing username", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    )
)]
pub async fn list_schedules_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    list_schedules(&state, ScheduleKind::Primary, query).await
}

/// GET /schedule/{trip_id}?username= - Read one schedule
#[utoipa::path(
    get,
    path = "/schedule/{trip_id}",
    params(("trip_id" = String, Path, description = "Client-supplied trip id."), UsernameQuery),
    responses(
        (status = 200, description = "The schedule", body = ScheduleResponse),
        (status = 403, description = "Owned by another user", body = MessageResponse),
        (status = 404, description = "Schedule not found", body = MessageResponse)
    )
)]
pub async fn get_schedule_handler(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    get_schedule(&state, ScheduleKind::Primary, &trip_id, query).await
}

/// DELETE /schedule/{trip_id}?username= - Delete one schedule
#[utoipa::path(
    delete,
    path = "/schedule/{trip_id}",
    params(("trip_id" = String, Path, description = "Client-supplied trip id."), UsernameQuery),
    responses(
        (status = 200, description = "Schedule deleted", body = MessageResponse),
        (status = 403, description = "Owned by another user", body = MessageResponse),
        (status = 404, description = "Schedule not found", body = MessageResponse),
        (status = 500, description = "Delete failed and was rolled back", body = MessageResponse)
    )
)]
pub async fn delete_schedule_handler(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    delete_schedule(&state, ScheduleKind::Primary, &trip_id, query).await
}

//=========================================================================================
// Handlers: /additional_schedule
//=========================================================================================

/// POST /additional_schedule - Create an additional schedule
#[utoipa::path(
    post,
    path = "/additional_schedule",
    request_body = CreateScheduleRequest,
    responses(
        (status = 201, description = "Additional schedule created", body = CreatedResponse),
        (status = 400, description = "Missing, malformed or duplicate field", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    )
)]
pub async fn create_additional_schedule_handler(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<CreateScheduleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    create_schedule(&state, ScheduleKind::Additional, req).await
}

/// GET /additional_schedule?username= - List a user's additional schedules
#[utoipa::path(
    get,
    path = "/additional_schedule",
    params(UsernameQuery),
    responses(
        (status = 200, description = "All additional schedules of the user", body = [ScheduleResponse]),
        (status = 400, description = "Missing username", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    )
)]
pub async fn list_additional_schedules_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    list_schedules(&state, ScheduleKind::Additional, query).await
}

/// GET /additional_schedule/{trip_id}?username= - Read one additional schedule
#[utoipa::path(
    get,
    path = "/additional_schedule/{trip_id}",
    params(("trip_id" = String, Path, description = "Client-supplied trip id."), UsernameQuery),
    responses(
        (status = 200, description = "The additional schedule", body = ScheduleResponse),
        (status = 403, description = "Owned by another user", body = MessageResponse),
        (status = 404, description = "Additional schedule not found", body = MessageResponse)
    )
)]
pub async fn get_additional_schedule_handler(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    get_schedule(&state, ScheduleKind::Additional, &trip_id, query).await
}

/// DELETE /additional_schedule/{trip_id}?username= - Delete one additional schedule
#[utoipa::path(
    delete,
    path = "/additional_schedule/{trip_id}",
    params(("trip_id" = String, Path, description = "Client-supplied trip id."), UsernameQuery),
    responses(
        (status = 200, description = "Additional schedule deleted", body = MessageResponse),
        (status = 403, description = "Owned by another user", body = MessageResponse),
        (status = 404, description = "Additional schedule not found", body = MessageResponse),
        (status = 500, description = "Delete failed and was rolled back", body = MessageResponse)
    )
)]
pub async fn delete_additional_schedule_handler(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    delete_schedule(&state, ScheduleKind::Additional, &trip_id, query).await
}
