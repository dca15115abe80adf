//! Composition utilities for building repositories with `SQLite` backends.
//!
//! Construction only; no domain logic lives here.

use sqlx::SqlitePool;
use std::sync::Arc;

use aibot_core::{CachePool, CrawlerPort, NoopCrawler, Repos};

use crate::repositories::{
    SqliteAnswerRepository, SqliteCollectRepository, SqliteFavoriteRepository,
    SqliteLikeRepository, SqliteQuestionRepository, SqliteTagRepository, SqliteUserRepository,
};

/// Factory for creating repository instances with `SQLite` backends.
pub struct CoreFactory;

impl CoreFactory {
    /// Build all `SQLite` repositories over one pool and one shared cache.
    ///
    /// The crawler slot is filled with [`NoopCrawler`]; use
    /// [`CoreFactory::build_repos_with_crawler`] to supply a real one.
    pub fn build_repos(pool: SqlitePool, cache: Arc<dyn CachePool>) -> Repos {
        Self::build_repos_with_crawler(pool, cache, Arc::new(NoopCrawler))
    }

    pub fn build_repos_with_crawler(
        pool: SqlitePool,
        cache: Arc<dyn CachePool>,
        crawler: Arc<dyn CrawlerPort>,
    ) -> Repos {
        Repos {
            users: Arc::new(SqliteUserRepository::new(pool.clone(), cache.clone())),
            questions: Arc::new(SqliteQuestionRepository::new(pool.clone(), cache.clone())),
            answers: Arc::new(SqliteAnswerRepository::new(pool.clone(), cache.clone())),
            tags: Arc::new(SqliteTagRepository::new(pool.clone(), cache.clone())),
            favorites: Arc::new(SqliteFavoriteRepository::new(pool.clone(), cache.clone())),
            collects: Arc::new(SqliteCollectRepository::new(pool.clone(), cache.clone())),
            likes: Arc::new(SqliteLikeRepository::new(pool, cache.clone())),
            crawler,
            cache,
        }
    }
}

/// Test database helper.
///
/// Provides an in-memory `SQLite` database with the production schema and
/// an unbounded memory cache, plus seeding shortcuts for fixtures.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    pool: SqlitePool,
    cache: Arc<aibot_core::MemoryCachePool>,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    /// Create a new in-memory test database with full schema.
    pub async fn new() -> anyhow::Result<Self> {
        let pool = crate::setup::setup_test_database().await?;
        Ok(Self {
            pool,
            cache: Arc::new(aibot_core::MemoryCachePool::new()),
        })
    }

    /// Get the underlying pool.
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The cache every repository built from this database shares.
    pub fn cache(&self) -> Arc<aibot_core::MemoryCachePool> {
        self.cache.clone()
    }

    fn shared_cache(&self) -> Arc<dyn CachePool> {
        self.cache.clone()
    }

    pub fn repos(&self) -> Repos {
        CoreFactory::build_repos(self.pool.clone(), self.shared_cache())
    }

    pub fn user_repository(&self) -> SqliteUserRepository {
        SqliteUserRepository::new(self.pool.clone(), self.shared_cache())
    }

    pub fn question_repository(&self) -> SqliteQuestionRepository {
        SqliteQuestionRepository::new(self.pool.clone(), self.shared_cache())
    }

    pub fn answer_repository(&self) -> SqliteAnswerRepository {
        SqliteAnswerRepository::new(self.pool.clone(), self.shared_cache())
    }

    pub fn tag_repository(&self) -> SqliteTagRepository {
        SqliteTagRepository::new(self.pool.clone(), self.shared_cache())
    }

    pub fn favorite_repository(&self) -> SqliteFavoriteRepository {
        SqliteFavoriteRepository::new(self.pool.clone(), self.shared_cache())
    }

    pub fn collect_repository(&self) -> SqliteCollectRepository {
        SqliteCollectRepository::new(self.pool.clone(), self.shared_cache())
    }

    pub fn like_repository(&self) -> SqliteLikeRepository {
        SqliteLikeRepository::new(self.pool.clone(), self.shared_cache())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Fixtures
    // ─────────────────────────────────────────────────────────────────────

    /// A syntactically valid bcrypt hash.
    pub fn bcrypt() -> String {
        format!("$2b$12${}", "a".repeat(53))
    }

    /// Insert a user named `name` with email `{name}@example.com`.
    pub async fn seed_user(&self, name: &str) -> anyhow::Result<i64> {
        use aibot_core::{AuthLevel, NewUser, UserRepository};

        let user = NewUser::new(
            format!("{name}@example.com"),
            Self::bcrypt(),
            name,
            AuthLevel::User,
            0,
        );
        Ok(self
            .user_repository()
            .insert_user(&tokio_util::sync::CancellationToken::new(), &user)
            .await?)
    }

    pub async fn seed_tag(&self, name: &str) -> anyhow::Result<i64> {
        use aibot_core::{NewTag, TagCategory, TagRepository};

        let tag = NewTag {
            category: TagCategory::Language,
            name: name.to_string(),
            desc: String::new(),
        };
        Ok(self
            .tag_repository()
            .insert_tag(&tokio_util::sync::CancellationToken::new(), &tag)
            .await?)
    }

    pub async fn seed_question(&self, uid: i64, title: &str, tags: &[i64]) -> anyhow::Result<i64> {
        use aibot_core::{NewQuestion, QuestionRepository};

        let question = NewQuestion {
            user_id: uid,
            title: title.to_string(),
            remarks: String::new(),
            tags: tags.to_vec(),
        };
        Ok(self
            .question_repository()
            .insert_question(&tokio_util::sync::CancellationToken::new(), &question)
            .await?)
    }

    pub async fn seed_answer(&self, uid: i64, qid: i64) -> anyhow::Result<i64> {
        use aibot_core::{AnswerRepository, NewAnswer};

        let answer = NewAnswer {
            user_id: uid,
            question_id: qid,
            content: format!("answer by {uid}"),
        };
        Ok(self
            .answer_repository()
            .insert_answer(&tokio_util::sync::CancellationToken::new(), &answer)
            .await?)
    }

    pub async fn seed_favorite(&self, uid: i64, name: &str) -> anyhow::Result<i64> {
        use aibot_core::{FavoriteRepository, NewFavorite};

        let favorite = NewFavorite {
            user_id: uid,
            name: name.to_string(),
        };
        Ok(self
            .favorite_repository()
            .insert_favorite(&tokio_util::sync::CancellationToken::new(), &favorite)
            .await?)
    }
}
