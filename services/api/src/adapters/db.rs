//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Structured fields (tag lists, transportation, days, extra info) live in TEXT
//! columns as JSON and are decoded on the way out. Every write runs inside its
//! own transaction; dropping an uncommitted `Transaction` rolls it back.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use travel_planner_core::codec::{decode_json, encode_json};
use travel_planner_core::domain::{
    Feedback, NewFeedback, NewPhoto, NewSchedule, NewUser, Photo, ProfileUpdate, ScheduleKind,
    TravelSchedule, User, UserCredentials,
};
use travel_planner_core::ports::{DatabaseService, PortError, PortResult, UniqueKey};

use crate::config::Config;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const NICKNAME_CONSTRAINT: &str = "users_nickname_key";
const TRIP_ID_CONSTRAINT_SUFFIX: &str = "_trip_id_key";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter` around an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens the connection pool described by `config`.
    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Closes every pooled connection. Called once during shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// Turns a unique-constraint violation into a typed conflict so a racing
/// insert that slipped past the pre-check is still reported, not swallowed.
fn map_write_error(e: sqlx::Error) -> PortError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(USERNAME_CONSTRAINT) => return PortError::Conflict(UniqueKey::Username),
                Some(NICKNAME_CONSTRAINT) => return PortError::Conflict(UniqueKey::Nickname),
                Some(name) if name.ends_with(TRIP_ID_CONSTRAINT_SUFFIX) => {
                    return PortError::Conflict(UniqueKey::TripId)
                }
                _ => {}
            }
        }
    }
    unexpected(e)
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    username: String,
    password_hash: String,
    nickname: String,
    birthyear: i32,
    gender: String,
    marketing_consent: bool,
    preferences: String,
    music_genres: String,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        Ok(User {
            id: self.id,
            username: self.username,
            nickname: self.nickname,
            birthyear: self.birthyear,
            gender: self.gender,
            marketing_consent: self.marketing_consent,
            preferences: decode_json(&self.preferences)?,
            music_genres: decode_json(&self.music_genres)?,
        })
    }

    fn to_credentials(mut self) -> PortResult<UserCredentials> {
        let hashed_password = std::mem::take(&mut self.password_hash);
        Ok(UserCredentials {
            user: self.to_domain()?,
            hashed_password,
        })
    }
}

#[derive(FromRow)]
struct ScheduleRecord {
    id: i64,
    owner: String,
    trip_id: String,
    timestamp: DateTime<Utc>,
    title: String,
    companion: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    duration: String,
    budget: Option<String>,
    transportation: String,
    keywords: String,
    summary: Option<String>,
    days: String,
    extra_info: Option<String>,
    generated_schedule_raw: Option<String>,
}
impl ScheduleRecord {
    fn to_domain(self) -> PortResult<TravelSchedule> {
        let extra_info = match self.extra_info.as_deref() {
            Some(text) => decode_json::<Map<String, Value>>(text)?,
            None => Map::new(),
        };
        Ok(TravelSchedule {
            id: self.id,
            owner: self.owner,
            trip_id: self.trip_id,
            timestamp: self.timestamp,
            title: self.title,
            companion: self.companion,
            start_date: self.start_date,
            end_date: self.end_date,
            duration: self.duration,
            budget: self.budget,
            transportation: decode_json(&self.transportation)?,
            keywords: decode_json(&self.keywords)?,
            summary: self.summary,
            days: decode_json(&self.days)?,
            extra_info,
            generated_schedule_raw: self.generated_schedule_raw,
        })
    }
}

#[derive(FromRow)]
struct FeedbackRecord {
    id: i64,
    rating: i32,
    deduction: Option<i32>,
    comment: Option<String>,
}
impl FeedbackRecord {
    fn to_domain(self) -> Feedback {
        Feedback {
            id: self.id,
            rating: self.rating,
            deduction: self.deduction,
            comment: self.comment,
        }
    }
}

#[derive(FromRow)]
struct PhotoRecord {
    id: i64,
    user_id: i64,
    photo_uri: String,
    location: Option<String>,
    timestamp: DateTime<Utc>,
}
impl PhotoRecord {
    fn to_domain(self) -> Photo {
        Photo {
            id: self.id,
            user_id: self.user_id,
            photo_uri: self.photo_uri,
            location: self.location,
            timestamp: self.timestamp,
        }
    }
}

const USER_COLUMNS: &str = "id, username, password_hash, nickname, birthyear, gender, \
     marketing_consent, preferences, music_genres";

fn schedule_select(kind: ScheduleKind) -> String {
    format!(
        r#"SELECT s.id, u.username AS owner, s.trip_id, s."timestamp", s.title, s.companion,
                  s.start_date, s.end_date, s.duration, s.budget, s.transportation, s.keywords,
                  s.summary, s.days, s.extra_info, s.generated_schedule_raw
           FROM {} s
           JOIN users u ON u.id = s.user_id"#,
        kind.table_name()
    )
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, user: NewUser) -> PortResult<i64> {
        let preferences = encode_json(&user.preferences)?;
        let music_genres = encode_json(&user.music_genres)?;

        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (username, password_hash, nickname, birthyear, gender, \
             marketing_consent, preferences, music_genres) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(&user.username)
        .bind(&user.hashed_password)
        .bind(&user.nickname)
        .bind(user.birthyear)
        .bind(&user.gender)
        .bind(user.marketing_consent)
        .bind(preferences)
        .bind(music_genres)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;
        tx.commit().await.map_err(map_write_error)?;
        Ok(id)
    }

    async fn username_exists(&self, username: &str) -> PortResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn nickname_exists(&self, nickname: &str) -> PortResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE nickname = $1)")
            .bind(nickname)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn get_user_credentials(&self, username: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", username)))?;
        record.to_credentials()
    }

    async fn get_user_by_username(&self, username: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", username)))?;
        record.to_domain()
    }

    async fn update_user_profile(&self, username: &str, update: ProfileUpdate) -> PortResult<()> {
        let preferences = update.preferences.as_ref().map(encode_json).transpose()?;
        let music_genres = update.music_genres.as_ref().map(encode_json).transpose()?;

        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let result = sqlx::query(
            "UPDATE users SET \
                nickname = COALESCE($2, nickname), \
                birthyear = COALESCE($3, birthyear), \
                gender = COALESCE($4, gender), \
                marketing_consent = COALESCE($5, marketing_consent), \
                preferences = COALESCE($6, preferences), \
                music_genres = COALESCE($7, music_genres) \
             WHERE username = $1",
        )
        .bind(username)
        .bind(update.nickname)
        .bind(update.birthyear)
        .bind(update.gender)
        .bind(update.marketing_consent)
        .bind(preferences)
        .bind(music_genres)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", username)));
        }
        tx.commit().await.map_err(map_write_error)?;
        Ok(())
    }

    async fn create_schedule(&self, kind: ScheduleKind, schedule: NewSchedule) -> PortResult<i64> {
        let transportation = encode_json(&schedule.transportation)?;
        let keywords = encode_json(&schedule.keywords)?;
        let days = encode_json(&schedule.days)?;
        let extra_info = encode_json(&schedule.extra_info)?;

        let sql = format!(
            r#"INSERT INTO {} (user_id, trip_id, "timestamp", title, companion, start_date,
                   end_date, duration, budget, transportation, keywords, summary, days,
                   extra_info, generated_schedule_raw)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
               RETURNING id"#,
            kind.table_name()
        );

        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let id = sqlx::query_scalar::<_, i64>(&sql)
            .bind(schedule.user_id)
            .bind(&schedule.trip_id)
            .bind(schedule.timestamp)
            .bind(&schedule.title)
            .bind(&schedule.companion)
            .bind(schedule.start_date)
            .bind(schedule.end_date)
            .bind(&schedule.duration)
            .bind(&schedule.budget)
            .bind(transportation)
            .bind(keywords)
            .bind(&schedule.summary)
            .bind(days)
            .bind(extra_info)
            .bind(&schedule.generated_schedule_raw)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;
        tx.commit().await.map_err(map_write_error)?;
        Ok(id)
    }

    async fn trip_id_exists(&self, kind: ScheduleKind, trip_id: &str) -> PortResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE trip_id = $1)",
            kind.table_name()
        );
        sqlx::query_scalar::<_, bool>(&sql)
            .bind(trip_id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn list_schedules_for_user(
        &self,
        kind: ScheduleKind,
        user_id: i64,
    ) -> PortResult<Vec<TravelSchedule>> {
        let sql = format!("{} WHERE s.user_id = $1 ORDER BY s.id ASC", schedule_select(kind));
        let records = sqlx::query_as::<_, ScheduleRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_schedule_by_trip_id(
        &self,
        kind: ScheduleKind,
        trip_id: &str,
    ) -> PortResult<TravelSchedule> {
        let sql = format!("{} WHERE s.trip_id = $1", schedule_select(kind));
        let record = sqlx::query_as::<_, ScheduleRecord>(&sql)
            .bind(trip_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("{} {} not found", kind.label(), trip_id)))?;
        record.to_domain()
    }

    async fn delete_schedule(&self, kind: ScheduleKind, trip_id: &str) -> PortResult<()> {
        let sql = format!("DELETE FROM {} WHERE trip_id = $1", kind.table_name());

        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let result = sqlx::query(&sql)
            .bind(trip_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("{} {} not found", kind.label(), trip_id)));
        }
        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn create_feedback(&self, feedback: NewFeedback) -> PortResult<i64> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO feedback (rating, deduction, comment) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(feedback.rating)
        .bind(feedback.deduction)
        .bind(feedback.comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;
        tx.commit().await.map_err(map_write_error)?;
        Ok(id)
    }

    async fn list_feedback(&self) -> PortResult<Vec<Feedback>> {
        let records = sqlx::query_as::<_, FeedbackRecord>(
            "SELECT id, rating, deduction, comment FROM feedback ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_photo(&self, photo: NewPhoto) -> PortResult<i64> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO photos (user_id, photo_uri, location, "timestamp")
               VALUES ($1, $2, $3, $4) RETURNING id"#,
        )
        .bind(photo.user_id)
        .bind(photo.photo_uri)
        .bind(photo.location)
        .bind(photo.timestamp)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;
        tx.commit().await.map_err(map_write_error)?;
        Ok(id)
    }

    async fn list_photos_for_user(&self, user_id: i64) -> PortResult<Vec<Photo>> {
        let records = sqlx::query_as::<_, PhotoRecord>(
            r#"SELECT id, user_id, photo_uri, location, "timestamp"
               FROM photos WHERE user_id = $1 ORDER BY id ASC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
