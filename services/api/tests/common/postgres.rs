#![allow(dead_code)]

use std::env;
use std::sync::atomic::{AtomicU64, Ordering};

use api_lib::adapters::DbAdapter;
use chrono::Utc;
use sqlx::{postgres::PgPoolOptions, PgPool};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Connects to `TEST_DATABASE_URL` and applies the migrations. Returns `None`
/// when the variable is unset so the suite still runs without a database.
pub async fn provision_database() -> Option<(DbAdapter, PgPool)> {
    let Ok(database_url) = env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL is not set, skipping postgres-backed test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("failed to connect to postgres for integration tests");

    let adapter = DbAdapter::new(pool.clone());
    adapter
        .run_migrations()
        .await
        .expect("failed to run migrations for integration tests");

    Some((adapter, pool))
}

/// Tests share one database and run in parallel, so every key they insert is
/// made unique instead of truncating tables between tests.
pub fn unique(prefix: &str) -> String {
    format!(
        "{prefix}-{}-{}-{}",
        std::process::id(),
        Utc::now().timestamp_micros(),
        SEQUENCE.fetch_add(1, Ordering::SeqCst)
    )
}
