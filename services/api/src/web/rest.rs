//! services/api/src/web/rest.rs
//!
//! Assembles the REST router and holds the master definition for the
//! OpenAPI specification.

use crate::error::ServiceError;
use crate::web::{
    auth, feedback,
    middleware::json_utf8_content_type,
    photos, protocol, schedules,
    state::AppState,
    users,
};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        users::get_user_handler,
        users::update_user_handler,
        schedules::create_schedule_handler,
        schedules::list_schedules_handler,
        schedules::get_schedule_handler,
        schedules::delete_schedule_handler,
        schedules::create_additional_schedule_handler,
        schedules::list_additional_schedules_handler,
        schedules::get_additional_schedule_handler,
        schedules::delete_additional_schedule_handler,
        feedback::create_feedback_handler,
        feedback::list_feedback_handler,
        photos::create_photo_handler,
        photos::list_photos_handler,
    ),
    components(
        schemas(
            protocol::MessageResponse,
            protocol::CreatedResponse,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::LoginResponse,
            users::ProfileResponse,
            users::UpdateProfileRequest,
            schedules::CreateScheduleRequest,
            schedules::ScheduleResponse,
            feedback::CreateFeedbackRequest,
            feedback::FeedbackResponse,
            photos::CreatePhotoRequest,
            photos::PhotoResponse,
        )
    ),
    tags(
        (name = "Travel Planner API", description = "Users, travel schedules, feedback and photo metadata for the travel planning app.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Router
//=========================================================================================

/// Builds the API router with every route of the service.
///
/// CORS and the Swagger UI are layered on by the binary, so tests can drive
/// this router directly.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register", post(auth::register_handler))
        .route("/login", post(auth::login_handler))
        .route(
            "/user/{username}",
            get(users::get_user_handler).put(users::update_user_handler),
        )
        .route(
            "/schedule",
            post(schedules::create_schedule_handler).get(schedules::list_schedules_handler),
        )
        .route(
            "/schedule/{trip_id}",
            get(schedules::get_schedule_handler).delete(schedules::delete_schedule_handler),
        )
        .route(
            "/additional_schedule",
            post(schedules::create_additional_schedule_handler)
                .get(schedules::list_additional_schedules_handler),
        )
        .route(
            "/additional_schedule/{trip_id}",
            get(schedules::get_additional_schedule_handler)
                .delete(schedules::delete_additional_schedule_handler),
        )
        .route(
            "/feedback",
            post(feedback::create_feedback_handler).get(feedback::list_feedback_handler),
        )
        .route(
            "/photos",
            post(photos::create_photo_handler).get(photos::list_photos_handler),
        )
        .fallback(not_found)
        .layer(axum_middleware::from_fn(json_utf8_content_type))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> ServiceError {
    ServiceError::NotFound
}
