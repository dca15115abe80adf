//! Answer repository trait definition.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::RepositoryError;
use crate::domain::{AnswerInfo, NewAnswer};

/// Repository for answers. A user answers a given question at most once.
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    async fn select_answer_by_id(
        &self,
        cancel: &CancellationToken,
        aid: i64,
    ) -> Result<Option<AnswerInfo>, RepositoryError>;

    /// The answer the user wrote for the question, if any. Both must exist.
    async fn select_answer_by_question_and_user(
        &self,
        cancel: &CancellationToken,
        qid: i64,
        uid: i64,
    ) -> Result<Option<i64>, RepositoryError>;

    /// Insert an answer and bump the question's modify time.
    async fn insert_answer(
        &self,
        cancel: &CancellationToken,
        answer: &NewAnswer,
    ) -> Result<i64, RepositoryError>;

    async fn update_answer(
        &self,
        cancel: &CancellationToken,
        aid: i64,
        content: &str,
    ) -> Result<(), RepositoryError>;

    /// Silent when missing. Clears the best-answer slot pointing at it.
    async fn delete_answer_by_id(
        &self,
        cancel: &CancellationToken,
        aid: i64,
    ) -> Result<(), RepositoryError>;
}
