//! Collect repository trait definition.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::RepositoryError;

/// Repository for questions and answers collected into favorite folders.
///
/// Mirrors [`super::LikeRepository`] with a favorite folder in the owner
/// position. Mutations check the favorite, then the target, then the
/// toggle state.
#[async_trait]
pub trait CollectRepository: Send + Sync {
    /// Questions in the folder, `None` when the favorite does not exist.
    async fn select_collected_questions(
        &self,
        cancel: &CancellationToken,
        fid: i64,
    ) -> Result<Option<Vec<i64>>, RepositoryError>;

    /// Answers in the folder, `None` when the favorite does not exist.
    async fn select_collected_answers(
        &self,
        cancel: &CancellationToken,
        fid: i64,
    ) -> Result<Option<Vec<i64>>, RepositoryError>;

    async fn select_collects_count_for_question(
        &self,
        cancel: &CancellationToken,
        qid: i64,
    ) -> Result<i64, RepositoryError>;

    async fn select_collects_count_for_answer(
        &self,
        cancel: &CancellationToken,
        aid: i64,
    ) -> Result<i64, RepositoryError>;

    async fn favorite_collected_question(
        &self,
        cancel: &CancellationToken,
        fid: i64,
        qid: i64,
    ) -> Result<bool, RepositoryError>;

    async fn favorite_collected_answer(
        &self,
        cancel: &CancellationToken,
        fid: i64,
        aid: i64,
    ) -> Result<bool, RepositoryError>;

    /// Whether any folder of the user holds the question.
    async fn user_collected_question(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        qid: i64,
    ) -> Result<bool, RepositoryError>;

    /// Whether any folder of the user holds the answer.
    async fn user_collected_answer(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        aid: i64,
    ) -> Result<bool, RepositoryError>;

    async fn insert_collect_for_question(
        &self,
        cancel: &CancellationToken,
        fid: i64,
        qid: i64,
    ) -> Result<(), RepositoryError>;

    async fn insert_collect_for_answer(
        &self,
        cancel: &CancellationToken,
        fid: i64,
        aid: i64,
    ) -> Result<(), RepositoryError>;

    async fn delete_collect_for_question(
        &self,
        cancel: &CancellationToken,
        fid: i64,
        qid: i64,
    ) -> Result<(), RepositoryError>;

    async fn delete_collect_for_answer(
        &self,
        cancel: &CancellationToken,
        fid: i64,
        aid: i64,
    ) -> Result<(), RepositoryError>;
}
