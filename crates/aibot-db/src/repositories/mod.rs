//! Repository implementations using `SQLite`.
//!
//! These implementations encapsulate all SQL queries and database access.
//! The `SqlitePool` is confined to this module and never exposed through
//! the port trait signatures.

pub mod base;
mod row_mappers;
mod sqlite_answer_repository;
mod sqlite_collect_repository;
mod sqlite_favorite_repository;
mod sqlite_like_repository;
mod sqlite_question_repository;
mod sqlite_tag_repository;
mod sqlite_user_repository;
mod toggle;

pub use base::{ChangeSet, ConflictKind, RepositoryBase, SaveReceipt, SqlValue};
pub use sqlite_answer_repository::SqliteAnswerRepository;
pub use sqlite_collect_repository::SqliteCollectRepository;
pub use sqlite_favorite_repository::SqliteFavoriteRepository;
pub use sqlite_like_repository::SqliteLikeRepository;
pub use sqlite_question_repository::SqliteQuestionRepository;
pub use sqlite_tag_repository::SqliteTagRepository;
pub use sqlite_user_repository::SqliteUserRepository;
