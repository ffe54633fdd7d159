//! services/api/src/web/feedback.rs
//!
//! Anonymous rating submissions.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use travel_planner_core::{
    domain::{Feedback, NewFeedback},
    validation::{validate_deduction, validate_rating},
};
use utoipa::ToSchema;

use crate::error::ServiceError;
use crate::web::{
    protocol::{CreatedResponse, MessageResponse, Payload},
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct CreateFeedbackRequest {
    /// 1 to 5 inclusive.
    pub rating: Option<i32>,
    /// Must not be negative when present.
    pub deduction: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedbackResponse {
    pub id: i64,
    pub rating: i32,
    pub deduction: Option<i32>,
    pub comment: Option<String>,
}

impl From<Feedback> for FeedbackResponse {
    fn from(f: Feedback) -> Self {
        Self {
            id: f.id,
            rating: f.rating,
            deduction: f.deduction,
            comment: f.comment,
        }
    }
}

/// POST /feedback - Submit a rating
#[utoipa::path(
    post,
    path = "/feedback",
    request_body = CreateFeedbackRequest,
    responses(
        (status = 201, description = "Feedback stored", body = CreatedResponse),
        (status = 400, description = "Missing or out-of-range rating, or negative deduction", body = MessageResponse)
    )
)]
pub async fn create_feedback_handler(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<CreateFeedbackRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let rating = validate_rating(req.rating.ok_or(ServiceError::MissingFields)?)?;
    let deduction = validate_deduction(req.deduction)?;

    let id = state
        .db
        .create_feedback(NewFeedback {
            rating,
            deduction,
            comment: req.comment,
        })
        .await
        .map_err(|e| {
            error!("Failed to store feedback: {:?}", e);
            ServiceError::internal(e)
        })?;

    info!("Stored feedback {} with rating {}", id, rating);
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Feedback submitted successfully".to_string(),
            id,
        }),
    ))
}

/// GET /feedback - List every feedback record
#[utoipa::path(
    get,
    path = "/feedback",
    responses(
        (status = 200, description = "All feedback", body = [FeedbackResponse])
    )
)]
pub async fn list_feedback_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FeedbackResponse>>, ServiceError> {
    let records = state.db.list_feedback().await.map_err(ServiceError::internal)?;
    Ok(Json(records.into_iter().map(FeedbackResponse::from).collect()))
}
