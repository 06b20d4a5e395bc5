use hackboard_domain::ServiceError;
use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub mod admins;
pub mod announcements;
pub mod scores;
pub mod teams;
pub mod users;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        full_name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS admins (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS teams (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        leader_id INTEGER NOT NULL REFERENCES users(id),
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS team_members (
        team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        PRIMARY KEY (team_id, user_id)
    )",
    "CREATE TABLE IF NOT EXISTS scores (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        team_id INTEGER NOT NULL UNIQUE REFERENCES teams(id) ON DELETE CASCADE,
        points INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS announcements (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
];

pub async fn init_schema(pool: &Pool<Sqlite>) -> sqlx::Result<()> {
    for stmt in SCHEMA {
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}

/// Opens (creating if missing) the database named by the HACKBOARD_DB env var
/// and bootstraps the schema.
pub async fn create_db_pool() -> Pool<Sqlite> {
    let db_path = std::env::var("HACKBOARD_DB").expect("HACKBOARD_DB env var not set");

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .expect("Failed to create pool");

    init_schema(&pool).await.expect("Failed to initialize schema");
    pool
}

/// One-connection in-memory database, used by tests.
pub async fn create_memory_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory pool");

    init_schema(&pool).await.expect("Failed to initialize schema");
    pool
}

pub(crate) fn map_db_err(e: sqlx::Error) -> ServiceError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ServiceError::Conflict(db.message().to_string())
        }
        _ => ServiceError::Internal(e.to_string()),
    }
}
