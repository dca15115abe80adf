//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` types in any signature
//! - Every repository operation takes `&CancellationToken` first and fails
//!   with [`RepositoryError::Cancelled`] once it is observed
//! - Writes report missing references as the matching `*NotExist` error;
//!   list reads return `None` for a missing parent instead

pub mod answer_repository;
pub mod cache_pool;
pub mod collect_repository;
pub mod crawler;
pub mod favorite_repository;
pub mod like_repository;
pub mod question_repository;
pub mod tag_repository;
pub mod user_repository;

use std::sync::Arc;
use thiserror::Error;

// Re-export repository traits for convenience
pub use answer_repository::AnswerRepository;
pub use cache_pool::{CacheKey, CachePool, CacheRegion, CacheValue};
pub use collect_repository::CollectRepository;
pub use crawler::{CrawledItem, CrawlerError, CrawlerPort, NoopCrawler};
pub use favorite_repository::FavoriteRepository;
pub use like_repository::LikeRepository;
pub use question_repository::QuestionRepository;
pub use tag_repository::TagRepository;
pub use user_repository::UserRepository;

/// Container for all repository trait objects.
///
/// Adapters build one of these at their composition root; services take it
/// without knowing which storage backs it.
#[derive(Clone)]
pub struct Repos {
    pub users: Arc<dyn UserRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub answers: Arc<dyn AnswerRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub favorites: Arc<dyn FavoriteRepository>,
    pub collects: Arc<dyn CollectRepository>,
    pub likes: Arc<dyn LikeRepository>,
    /// External content source. Opaque to the repositories.
    pub crawler: Arc<dyn CrawlerPort>,
    /// Shared cache handle the repositories were built with.
    pub cache: Arc<dyn CachePool>,
}

/// Failure conditions raised by every repository.
///
/// Apart from [`RepositoryError::Storage`] these are domain conditions the
/// upper layers translate into user-facing responses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    // Referenced entity missing
    #[error("user with uid={0} does not exist")]
    UserNotExist(i64),

    #[error("question with qid={0} does not exist")]
    QuestionNotExist(i64),

    #[error("answer with aid={0} does not exist")]
    AnswerNotExist(i64),

    #[error("tag with tid={0} does not exist")]
    TagNotExist(i64),

    #[error("favorite with fid={0} does not exist")]
    FavoriteNotExist(i64),

    // Uniqueness
    #[error("user with email={0} already exists")]
    EmailHasExist(String),

    #[error("user with name={0} already exists")]
    NameHasExist(String),

    #[error("tag with name={0} already exists")]
    TagNameHasExist(String),

    // Bounded lengths, counted in characters
    #[error("user name has max length={max}, got {actual}")]
    UserNameTooLong { actual: usize, max: usize },

    #[error("user email has max length={max}, got {actual}")]
    UserEmailTooLong { actual: usize, max: usize },

    #[error("user bcrypt must have length={required}, got {actual}")]
    UserBcryptLength { actual: usize, required: usize },

    #[error("question title has max length={max}, got {actual}")]
    QuestionTitleTooLong { actual: usize, max: usize },

    #[error("tag name has max length={max}, got {actual}")]
    TagNameTooLong { actual: usize, max: usize },

    #[error("favorite name has max length={max}, got {actual}")]
    FavoriteNameTooLong { actual: usize, max: usize },

    // Toggle state
    #[error("user with uid={uid} has already liked target with id={target}")]
    UserHasLikedTarget { uid: i64, target: i64 },

    #[error("user with uid={uid} has not liked target with id={target}")]
    UserNotLikedTarget { uid: i64, target: i64 },

    #[error("favorite with fid={fid} has already collected target with id={target}")]
    FavoriteHasCollectedTarget { fid: i64, target: i64 },

    #[error("favorite with fid={fid} has not collected target with id={target}")]
    FavoriteNotCollectedTarget { fid: i64, target: i64 },

    #[error("user with uid={uid} has already answered question with qid={qid}")]
    UserHasAnsweredQuestion { uid: i64, qid: i64 },

    /// A required field of an insert payload was not supplied.
    #[error("missing required parameter: {0}")]
    InvalidParameter(&'static str),

    /// The cancellation token was observed before the operation completed.
    #[error("operation cancelled")]
    Cancelled,

    /// Storage backend error. Never retried.
    #[error("storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    /// True for the `*NotExist` family.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotExist(_)
                | Self::QuestionNotExist(_)
                | Self::AnswerNotExist(_)
                | Self::TagNotExist(_)
                | Self::FavoriteNotExist(_)
        )
    }

    /// True for uniqueness collisions.
    #[must_use]
    pub const fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Self::EmailHasExist(_) | Self::NameHasExist(_) | Self::TagNameHasExist(_)
        )
    }

    /// True for the bounded-length family.
    #[must_use]
    pub const fn is_length_exceeded(&self) -> bool {
        matches!(
            self,
            Self::UserNameTooLong { .. }
                | Self::UserEmailTooLong { .. }
                | Self::UserBcryptLength { .. }
                | Self::QuestionTitleTooLong { .. }
                | Self::TagNameTooLong { .. }
                | Self::FavoriteNameTooLong { .. }
        )
    }

    /// True for like/collect state violations.
    #[must_use]
    pub const fn is_toggle_state(&self) -> bool {
        matches!(
            self,
            Self::UserHasLikedTarget { .. }
                | Self::UserNotLikedTarget { .. }
                | Self::FavoriteHasCollectedTarget { .. }
                | Self::FavoriteNotCollectedTarget { .. }
        )
    }
}
