//! Database setup and initialization.
//!
//! Entry points call [`setup_database`] with the resolved database path, or
//! [`setup_database_url`] with a connection URL.

use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// How long a connection waits on a locked database before reporting busy.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Sets up the `SQLite` database connection and ensures the schema exists.
///
/// This function:
/// 1. Creates the parent directory and database file if needed
/// 2. Enables WAL journaling and foreign key enforcement
/// 3. Creates all tables and indexes
///
/// # Example
///
/// ```rust,no_run
/// use aibot_db::setup_database;
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// let pool = setup_database(Path::new("/path/to/aibot.db")).await?;
/// # Ok(())
/// # }
/// ```
pub async fn setup_database(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    connect(SqliteConnectOptions::new().filename(db_path)).await
}

/// Like [`setup_database`], for a `sqlite:` connection URL.
pub async fn setup_database_url(url: &str) -> Result<SqlitePool> {
    connect(SqliteConnectOptions::from_str(url)?).await
}

async fn connect(options: SqliteConnectOptions) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .connect_with(
            options
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(BUSY_TIMEOUT)
                .foreign_keys(true),
        )
        .await?;

    create_schema(&pool).await?;
    tracing::info!("database schema ready");

    Ok(pool)
}

/// Sets up an in-memory `SQLite` database for testing.
///
/// The pool holds a single connection that never expires, since every
/// in-memory connection is a separate database.
#[cfg(any(test, feature = "test-utils"))]
pub async fn setup_test_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true))
        .await?;
    create_schema(&pool).await?;
    Ok(pool)
}

/// Creates the complete database schema.
///
/// Safe to call multiple times as all operations use IF NOT EXISTS.
/// Timestamps are stored as RFC 3339 UTC text, so they order lexically.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            bcrypt TEXT NOT NULL,
            name TEXT NOT NULL UNIQUE,
            auth INTEGER NOT NULL,
            profile_photo INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            question_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER,
            title TEXT NOT NULL,
            remarks TEXT NOT NULL DEFAULT '',
            best_answer INTEGER,
            create_time TEXT NOT NULL,
            modify_time TEXT NOT NULL,
            hot_value INTEGER NOT NULL DEFAULT 0,
            hot_fresh_time TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(user_id) ON DELETE SET NULL,
            FOREIGN KEY (best_answer) REFERENCES answers(answer_id) ON DELETE SET NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS answers (
            answer_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER,
            question_id INTEGER NOT NULL,
            content TEXT NOT NULL,
            create_time TEXT NOT NULL,
            modify_time TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(user_id) ON DELETE SET NULL,
            FOREIGN KEY (question_id) REFERENCES questions(question_id) ON DELETE CASCADE,
            UNIQUE(user_id, question_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            tag_id INTEGER PRIMARY KEY AUTOINCREMENT,
            category INTEGER NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            UNIQUE(category, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS question_tags (
            question_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL,
            weight INTEGER NOT NULL DEFAULT 1,
            PRIMARY KEY (question_id, tag_id),
            FOREIGN KEY (question_id) REFERENCES questions(question_id) ON DELETE CASCADE,
            FOREIGN KEY (tag_id) REFERENCES tags(tag_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS favorites (
            favorite_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            create_time TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(user_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Like and collect join tables share one shape: (owner, target, create_time)
    for (table, owner, owner_table, target, target_table) in [
        ("like_questions", "user_id", "users", "question_id", "questions"),
        ("like_answers", "user_id", "users", "answer_id", "answers"),
        ("collect_questions", "favorite_id", "favorites", "question_id", "questions"),
        ("collect_answers", "favorite_id", "favorites", "answer_id", "answers"),
    ] {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                {owner} INTEGER NOT NULL,
                {target} INTEGER NOT NULL,
                create_time TEXT NOT NULL,
                PRIMARY KEY ({owner}, {target}),
                FOREIGN KEY ({owner}) REFERENCES {owner_table}({owner}) ON DELETE CASCADE,
                FOREIGN KEY ({target}) REFERENCES {target_table}({target}) ON DELETE CASCADE
            )
            "#
        ))
        .execute(pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_{target} ON {table}({target})"
        ))
        .execute(pool)
        .await?;
    }

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_questions_user ON questions(user_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_questions_hot ON questions(hot_value)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_answers_question ON answers(question_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_question_tags_tag ON question_tags(tag_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_favorites_user ON favorites(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_setup_test_database() {
        let pool = setup_test_database().await.unwrap();

        for table in [
            "users",
            "questions",
            "answers",
            "tags",
            "question_tags",
            "favorites",
            "like_questions",
            "like_answers",
            "collect_questions",
            "collect_answers",
        ] {
            let _: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&pool)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_create_schema_is_idempotent() {
        let pool = setup_test_database().await.unwrap();
        create_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_setup_database_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("aibot.db");
        let pool = setup_database(&path).await.unwrap();

        let fk: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(fk, 1);
        assert!(path.exists());
    }
}
