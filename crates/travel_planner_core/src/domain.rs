//! crates/travel_planner_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

/// Represents a registered user together with their profile.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub nickname: String,
    pub birthyear: i32,
    pub gender: String,
    pub marketing_consent: bool,
    pub preferences: Vec<String>,
    pub music_genres: Vec<String>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub hashed_password: String,
}

/// Everything needed to insert a freshly registered user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub hashed_password: String,
    pub nickname: String,
    pub birthyear: i32,
    pub gender: String,
    pub marketing_consent: bool,
    pub preferences: Vec<String>,
    pub music_genres: Vec<String>,
}

/// A partial profile change. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub nickname: Option<String>,
    pub birthyear: Option<i32>,
    pub gender: Option<String>,
    pub marketing_consent: Option<bool>,
    pub preferences: Option<Vec<String>>,
    pub music_genres: Option<Vec<String>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Selects which of the two structurally identical schedule tables is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleKind {
    Primary,
    Additional,
}

impl ScheduleKind {
    pub fn table_name(self) -> &'static str {
        match self {
            ScheduleKind::Primary => "travel_schedules",
            ScheduleKind::Additional => "additional_travel_schedules",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScheduleKind::Primary => "Schedule",
            ScheduleKind::Additional => "Additional schedule",
        }
    }
}

/// One planned trip as stored, with the owning user's username resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelSchedule {
    pub id: i64,
    pub owner: String,
    pub trip_id: String,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub companion: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: String,
    pub budget: Option<String>,
    pub transportation: Vec<Value>,
    pub keywords: Vec<String>,
    pub summary: Option<String>,
    pub days: Value,
    pub extra_info: Map<String, Value>,
    pub generated_schedule_raw: Option<String>,
}

/// A schedule about to be inserted for the user identified by `user_id`.
#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub user_id: i64,
    pub trip_id: String,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub companion: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: String,
    pub budget: Option<String>,
    pub transportation: Vec<Value>,
    pub keywords: Vec<String>,
    pub summary: Option<String>,
    pub days: Value,
    pub extra_info: Map<String, Value>,
    pub generated_schedule_raw: Option<String>,
}

/// A free-standing rating record. Not tied to any user.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub id: i64,
    pub rating: i32,
    pub deduction: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub rating: i32,
    pub deduction: Option<i32>,
    pub comment: Option<String>,
}

/// Metadata for a captured image.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: i64,
    pub user_id: i64,
    pub photo_uri: String,
    pub location: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub user_id: i64,
    pub photo_uri: String,
    pub location: Option<String>,
    pub timestamp: DateTime<Utc>,
}
