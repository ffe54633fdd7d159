//! services/api/src/web/protocol.rs
//!
//! Wire-level building blocks shared by every handler: the JSON body
//! extractor, the `?username=` query, the message envelopes returned on
//! success, and field coercion helpers.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use travel_planner_core::validation::is_blank;
use utoipa::{IntoParams, ToSchema};

use crate::error::ServiceError;

//=========================================================================================
// Request side
//=========================================================================================

/// A JSON request body. Unlike `axum::Json`, a malformed or mistyped body is
/// reported as a `BadRequest` with a `{"message": ...}` body.
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => Err(ServiceError::BadRequest(rejection.body_text())),
        }
    }
}

/// The `?username=` query parameter used by list, read and delete routes.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UsernameQuery {
    /// Username of the user whose records are addressed.
    pub username: Option<String>,
}

impl UsernameQuery {
    pub fn require(self) -> Result<String, ServiceError> {
        require_field(self.username)
    }
}

/// Returns the value, or `MissingFields` when it is absent or blank.
pub fn require_field(value: Option<String>) -> Result<String, ServiceError> {
    match value {
        Some(v) if !is_blank(Some(&v)) => Ok(v),
        _ => Err(ServiceError::MissingFields),
    }
}

/// Like [`require_field`] but names the missing field in a `BadRequest`,
/// which is how schedule creation reports incomplete payloads.
pub fn require_named<T>(value: Option<T>, name: &str) -> Result<T, ServiceError> {
    value.ok_or_else(|| ServiceError::BadRequest(format!("Missing required field: {name}")))
}

/// Coerces loosely typed client input into a boolean. Booleans pass through,
/// numbers are true when non-zero, and strings are true for the usual
/// affirmative spellings. Everything else is false.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "y" | "on"
        ),
        _ => false,
    }
}

/// `deserialize_with` adapter for [`coerce_bool`]. `null` maps to `None`.
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_bool))
}

//=========================================================================================
// Response side
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Returned by every create endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i64,
}
