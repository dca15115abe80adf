//! Shared setup for the `aibot-db` integration tests.
//!
//! Each test gets its own on-disk database in a temporary directory, so
//! several pooled connections see the same data.

use std::sync::Arc;

use aibot_core::{AuthLevel, CancellationToken, MemoryCachePool, NewUser, Repos};
use aibot_db::{CoreFactory, setup_database};
use tempfile::TempDir;

pub struct FileDb {
    // Dropping the directory removes the database.
    _dir: TempDir,
    pub repos: Repos,
}

pub async fn file_db() -> FileDb {
    let dir = tempfile::tempdir().unwrap();
    let pool = setup_database(&dir.path().join("aibot.db")).await.unwrap();
    let repos = CoreFactory::build_repos(pool, Arc::new(MemoryCachePool::new()));
    FileDb { _dir: dir, repos }
}

pub fn bcrypt() -> String {
    format!("$2b$12${}", "b".repeat(53))
}

pub fn new_user(name: &str) -> NewUser {
    NewUser::new(
        format!("{name}@example.com"),
        bcrypt(),
        name,
        AuthLevel::User,
        0,
    )
}

pub async fn seed_user(repos: &Repos, name: &str) -> i64 {
    repos
        .users
        .insert_user(&CancellationToken::new(), &new_user(name))
        .await
        .unwrap()
}
