//! Core domain types, ports and services for the AIBot Q&A backend.
//!
//! This crate owns everything the storage adapters implement against:
//!
//! - [`domain`] - plain records for users, questions, answers, tags and favorites
//! - [`ports`] - one repository trait per aggregate plus the shared [`RepositoryError`]
//! - [`cache`] - the in-process [`MemoryCachePool`] injected into repositories
//! - [`contracts`] - flat DTOs handed to the service/API layer
//! - [`services`] - thin orchestrators composing several repositories
//!
//! No `sqlx` type appears in any public signature; `aibot-db` provides the
//! `SQLite` implementations.

#![deny(unused_crate_dependencies)]

pub mod cache;
pub mod contracts;
pub mod domain;
pub mod paths;
pub mod ports;
pub mod services;
pub mod utils;

// Re-export commonly used types for convenience
pub use cache::{MemoryCachePool, NoopCachePool};
pub use contracts::{AnswerInformation, QuestionInformation, QuestionModifyItems, TagInformation};
pub use domain::{
    AnswerIdInfo, AnswerInfo, AuthLevel, FavoriteInfo, ListOrder, NewAnswer, NewFavorite,
    NewQuestion, NewTag, NewUser, QuestionInfo, QuestionTag, QuestionUpdate, TagCategory, TagInfo,
    TagUpdate, User, UserUpdate,
};
pub use ports::{
    AnswerRepository, CacheKey, CachePool, CacheRegion, CollectRepository, CrawledItem,
    CrawlerError, CrawlerPort, FavoriteRepository, LikeRepository, NoopCrawler,
    QuestionRepository, Repos, RepositoryError, TagRepository, UserRepository,
};
pub use services::QuestionService;

// Re-export path utilities
pub use paths::{PathError, data_root, database_path, database_path_in};

// Every port operation takes a cancellation token.
pub use tokio_util::sync::CancellationToken;
