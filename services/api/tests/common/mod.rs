#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use api_lib::web::{build_router, AppState};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use travel_planner_core::{
    domain::{
        Feedback, NewFeedback, NewPhoto, NewSchedule, NewUser, Photo, ProfileUpdate, ScheduleKind,
        TravelSchedule, User, UserCredentials,
    },
    ports::{DatabaseService, PortError, PortResult, UniqueKey},
};

//=========================================================================================
// In-memory storage
//=========================================================================================

struct StoredSchedule {
    user_id: i64,
    schedule: TravelSchedule,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<UserCredentials>,
    schedules: HashMap<ScheduleKind, Vec<StoredSchedule>>,
    feedback: Vec<Feedback>,
    photos: Vec<Photo>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A `DatabaseService` backed by vectors behind a mutex. It enforces the same
/// unique keys the Postgres schema does.
#[derive(Default)]
pub struct InMemoryDb {
    tables: Mutex<Tables>,
    pub fail_deletes: AtomicBool,
    /// When set, existence checks report `false`, as if another writer
    /// committed between the check and the insert.
    pub stale_prechecks: AtomicBool,
}

impl InMemoryDb {
    pub fn schedule_count(&self, kind: ScheduleKind) -> usize {
        let tables = self.tables.lock().unwrap();
        tables.schedules.get(&kind).map_or(0, Vec::len)
    }

    pub fn stored_password_hash(&self, username: &str) -> Option<String> {
        let tables = self.tables.lock().unwrap();
        tables
            .users
            .iter()
            .find(|c| c.user.username == username)
            .map(|c| c.hashed_password.clone())
    }
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_user(&self, user: NewUser) -> PortResult<i64> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|c| c.user.username == user.username) {
            return Err(PortError::Conflict(UniqueKey::Username));
        }
        if tables.users.iter().any(|c| c.user.nickname == user.nickname) {
            return Err(PortError::Conflict(UniqueKey::Nickname));
        }
        let id = tables.next_id();
        tables.users.push(UserCredentials {
            user: User {
                id,
                username: user.username,
                nickname: user.nickname,
                birthyear: user.birthyear,
                gender: user.gender,
                marketing_consent: user.marketing_consent,
                preferences: user.preferences,
                music_genres: user.music_genres,
            },
            hashed_password: user.hashed_password,
        });
        Ok(id)
    }

    async fn username_exists(&self, username: &str) -> PortResult<bool> {
        if self.stale_prechecks.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().any(|c| c.user.username == username))
    }

    async fn nickname_exists(&self, nickname: &str) -> PortResult<bool> {
        if self.stale_prechecks.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().any(|c| c.user.nickname == nickname))
    }

    async fn get_user_credentials(&self, username: &str) -> PortResult<UserCredentials> {
        let tables = self.tables.lock().unwrap();
        tables
            .users
            .iter()
            .find(|c| c.user.username == username)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", username)))
    }

    async fn get_user_by_username(&self, username: &str) -> PortResult<User> {
        self.get_user_credentials(username).await.map(|c| c.user)
    }

    async fn update_user_profile(&self, username: &str, update: ProfileUpdate) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(nickname) = update.nickname.as_deref() {
            if tables
                .users
                .iter()
                .any(|c| c.user.nickname == nickname && c.user.username != username)
            {
                return Err(PortError::Conflict(UniqueKey::Nickname));
            }
        }
        let creds = tables
            .users
            .iter_mut()
            .find(|c| c.user.username == username)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", username)))?;
        let user = &mut creds.user;
        if let Some(v) = update.nickname {
            user.nickname = v;
        }
        if let Some(v) = update.birthyear {
            user.birthyear = v;
        }
        if let Some(v) = update.gender {
            user.gender = v;
        }
        if let Some(v) = update.marketing_consent {
            user.marketing_consent = v;
        }
        if let Some(v) = update.preferences {
            user.preferences = v;
        }
        if let Some(v) = update.music_genres {
            user.music_genres = v;
        }
        Ok(())
    }

    async fn create_schedule(&self, kind: ScheduleKind, s: NewSchedule) -> PortResult<i64> {
        let mut tables = self.tables.lock().unwrap();
        let owner = tables
            .users
            .iter()
            .find(|c| c.user.id == s.user_id)
            .map(|c| c.user.username.clone())
            .ok_or_else(|| PortError::Unexpected("foreign key violation on user_id".into()))?;
        if tables
            .schedules
            .get(&kind)
            .is_some_and(|rows| rows.iter().any(|r| r.schedule.trip_id == s.trip_id))
        {
            return Err(PortError::Conflict(UniqueKey::TripId));
        }
        let id = tables.next_id();
        tables.schedules.entry(kind).or_default().push(StoredSchedule {
            user_id: s.user_id,
            schedule: TravelSchedule {
                id,
                owner,
                trip_id: s.trip_id,
                timestamp: s.timestamp,
                title: s.title,
                companion: s.companion,
                start_date: s.start_date,
                end_date: s.end_date,
                duration: s.duration,
                budget: s.budget,
                transportation: s.transportation,
                keywords: s.keywords,
                summary: s.summary,
                days: s.days,
                extra_info: s.extra_info,
                generated_schedule_raw: s.generated_schedule_raw,
            },
        });
        Ok(id)
    }

    async fn trip_id_exists(&self, kind: ScheduleKind, trip_id: &str) -> PortResult<bool> {
        if self.stale_prechecks.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .schedules
            .get(&kind)
            .is_some_and(|rows| rows.iter().any(|r| r.schedule.trip_id == trip_id)))
    }

    async fn list_schedules_for_user(
        &self,
        kind: ScheduleKind,
        user_id: i64,
    ) -> PortResult<Vec<TravelSchedule>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .schedules
            .get(&kind)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.user_id == user_id)
                    .map(|r| r.schedule.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_schedule_by_trip_id(
        &self,
        kind: ScheduleKind,
        trip_id: &str,
    ) -> PortResult<TravelSchedule> {
        let tables = self.tables.lock().unwrap();
        tables
            .schedules
            .get(&kind)
            .and_then(|rows| rows.iter().find(|r| r.schedule.trip_id == trip_id))
            .map(|r| r.schedule.clone())
            .ok_or_else(|| PortError::NotFound(format!("{} not found", trip_id)))
    }

    async fn delete_schedule(&self, kind: ScheduleKind, trip_id: &str) -> PortResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("connection reset during commit".into()));
        }
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.schedules.entry(kind).or_default();
        let before = rows.len();
        rows.retain(|r| r.schedule.trip_id != trip_id);
        if rows.len() == before {
            return Err(PortError::NotFound(format!("{} not found", trip_id)));
        }
        Ok(())
    }

    async fn create_feedback(&self, feedback: NewFeedback) -> PortResult<i64> {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        tables.feedback.push(Feedback {
            id,
            rating: feedback.rating,
            deduction: feedback.deduction,
            comment: feedback.comment,
        });
        Ok(id)
    }

    async fn list_feedback(&self) -> PortResult<Vec<Feedback>> {
        Ok(self.tables.lock().unwrap().feedback.clone())
    }

    async fn create_photo(&self, photo: NewPhoto) -> PortResult<i64> {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        tables.photos.push(Photo {
            id,
            user_id: photo.user_id,
            photo_uri: photo.photo_uri,
            location: photo.location,
            timestamp: photo.timestamp,
        });
        Ok(id)
    }

    async fn list_photos_for_user(&self, user_id: i64) -> PortResult<Vec<Photo>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .photos
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}

//=========================================================================================
// HTTP helpers
//=========================================================================================

pub struct TestApp {
    pub router: Router,
    pub db: Arc<InMemoryDb>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

pub fn test_app() -> TestApp {
    let db = Arc::new(InMemoryDb::default());
    let state = Arc::new(AppState::new(db.clone()));
    TestApp {
        router: build_router(state),
        db,
    }
}

impl TestApp {
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.dispatch(request).await
    }

    pub async fn send_raw(&self, method: Method, uri: &str, raw: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw.to_string()))
            .unwrap();
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    /// Inserts a user straight into storage, skipping password hashing.
    pub async fn seed_user(&self, username: &str, nickname: &str) -> i64 {
        self.db
            .create_user(NewUser {
                username: username.to_string(),
                hashed_password: "unused".to_string(),
                nickname: nickname.to_string(),
                birthyear: 1990,
                gender: "F".to_string(),
                marketing_consent: false,
                preferences: Vec::new(),
                music_genres: Vec::new(),
            })
            .await
            .unwrap()
    }
}
