//! crates/travel_planner_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The storage port is the boundary of the hexagonal architecture: the HTTP
//! layer talks to it through `Arc<dyn DatabaseService>` and never sees SQL.

use async_trait::async_trait;

use crate::domain::{
    Feedback, NewFeedback, NewPhoto, NewSchedule, NewUser, Photo, ProfileUpdate, ScheduleKind,
    TravelSchedule, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The globally unique keys guarded by storage constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    Username,
    Nickname,
    TripId,
}

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the storage engine.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unique constraint violated: {0:?}")]
    Conflict(UniqueKey),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Users ---
    async fn create_user(&self, user: NewUser) -> PortResult<i64>;

    async fn username_exists(&self, username: &str) -> PortResult<bool>;

    async fn nickname_exists(&self, nickname: &str) -> PortResult<bool>;

    async fn get_user_credentials(&self, username: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_username(&self, username: &str) -> PortResult<User>;

    /// Applies only the fields present in `update`.
    async fn update_user_profile(&self, username: &str, update: ProfileUpdate) -> PortResult<()>;

    // --- Schedules (primary and additional share one contract) ---
    async fn create_schedule(&self, kind: ScheduleKind, schedule: NewSchedule) -> PortResult<i64>;

    async fn trip_id_exists(&self, kind: ScheduleKind, trip_id: &str) -> PortResult<bool>;

    async fn list_schedules_for_user(
        &self,
        kind: ScheduleKind,
        user_id: i64,
    ) -> PortResult<Vec<TravelSchedule>>;

    async fn get_schedule_by_trip_id(
        &self,
        kind: ScheduleKind,
        trip_id: &str,
    ) -> PortResult<TravelSchedule>;

    async fn delete_schedule(&self, kind: ScheduleKind, trip_id: &str) -> PortResult<()>;

    // --- Feedback ---
    async fn create_feedback(&self, feedback: NewFeedback) -> PortResult<i64>;

    async fn list_feedback(&self) -> PortResult<Vec<Feedback>>;

    // --- Photos ---
    async fn create_photo(&self, photo: NewPhoto) -> PortResult<i64>;

    async fn list_photos_for_user(&self, user_id: i64) -> PortResult<Vec<Photo>>;
}
