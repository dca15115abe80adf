//! Like repository trait definition.
//!
//! A like is a `(user, target)` pair where the target is a question or an
//! answer. Each pair exists at most once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use super::RepositoryError;

/// Repository for user likes on questions and answers.
///
/// Mutations check, in order: the user exists, the target exists, the
/// current toggle state. The first failing check decides the error.
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Questions the user liked, `None` when the user does not exist.
    async fn select_liked_questions_for_user(
        &self,
        cancel: &CancellationToken,
        uid: i64,
    ) -> Result<Option<Vec<i64>>, RepositoryError>;

    /// Answers the user liked, `None` when the user does not exist.
    async fn select_liked_answers_for_user(
        &self,
        cancel: &CancellationToken,
        uid: i64,
    ) -> Result<Option<Vec<i64>>, RepositoryError>;

    async fn select_likes_count_for_question(
        &self,
        cancel: &CancellationToken,
        qid: i64,
    ) -> Result<i64, RepositoryError>;

    async fn select_likes_count_for_answer(
        &self,
        cancel: &CancellationToken,
        aid: i64,
    ) -> Result<i64, RepositoryError>;

    /// Likes created at or after `start`.
    async fn select_likes_count_for_question_after_time(
        &self,
        cancel: &CancellationToken,
        qid: i64,
        start: DateTime<Utc>,
    ) -> Result<i64, RepositoryError>;

    /// Likes created at or after `start`.
    async fn select_likes_count_for_answer_after_time(
        &self,
        cancel: &CancellationToken,
        aid: i64,
        start: DateTime<Utc>,
    ) -> Result<i64, RepositoryError>;

    async fn user_liked_question(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        qid: i64,
    ) -> Result<bool, RepositoryError>;

    async fn user_liked_answer(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        aid: i64,
    ) -> Result<bool, RepositoryError>;

    /// Fails with `UserHasLikedTarget` when the like already exists.
    async fn insert_like_for_question(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        qid: i64,
    ) -> Result<(), RepositoryError>;

    /// Fails with `UserHasLikedTarget` when the like already exists.
    async fn insert_like_for_answer(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        aid: i64,
    ) -> Result<(), RepositoryError>;

    /// Fails with `UserNotLikedTarget` when there is nothing to remove.
    async fn delete_like_for_question(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        qid: i64,
    ) -> Result<(), RepositoryError>;

    /// Fails with `UserNotLikedTarget` when there is nothing to remove.
    async fn delete_like_for_answer(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        aid: i64,
    ) -> Result<(), RepositoryError>;
}
