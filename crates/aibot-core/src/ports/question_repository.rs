//! Question repository trait definition.
//!
//! Questions own their answers (deleting a question deletes its answers)
//! and carry a weighted tag set.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use super::RepositoryError;
use crate::domain::{NewQuestion, QuestionInfo, QuestionTag, QuestionUpdate};

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn select_question_by_id(
        &self,
        cancel: &CancellationToken,
        qid: i64,
    ) -> Result<Option<QuestionInfo>, RepositoryError>;

    /// Answers of the question, `None` when the question does not exist.
    async fn select_answers_for_question_by_id(
        &self,
        cancel: &CancellationToken,
        qid: i64,
    ) -> Result<Option<Vec<i64>>, RepositoryError>;

    /// Tags of the question with their weights, heaviest first.
    async fn select_tags_for_question_by_id(
        &self,
        cancel: &CancellationToken,
        qid: i64,
    ) -> Result<Option<Vec<QuestionTag>>, RepositoryError>;

    /// Questions carrying every listed tag, most recently modified first.
    ///
    /// `page` is zero-based. An unknown tag id fails with `TagNotExist`.
    async fn select_questions_by_tags(
        &self,
        cancel: &CancellationToken,
        tags: &[i64],
        page_size: u32,
        page: u32,
    ) -> Result<Vec<i64>, RepositoryError>;

    /// Questions with the highest hot value.
    async fn select_hottest_questions(
        &self,
        cancel: &CancellationToken,
        limit: u32,
    ) -> Result<Vec<i64>, RepositoryError>;

    /// Insert a question and attach its tags with weight 1.
    async fn insert_question(
        &self,
        cancel: &CancellationToken,
        question: &NewQuestion,
    ) -> Result<i64, RepositoryError>;

    /// Apply a partial update and bump the modify time.
    ///
    /// A best answer must be an answer of this question, otherwise the
    /// update fails with `AnswerNotExist`.
    async fn update_question(
        &self,
        cancel: &CancellationToken,
        qid: i64,
        update: &QuestionUpdate,
    ) -> Result<(), RepositoryError>;

    /// Set the weight of an existing question/tag association.
    async fn update_tag_weight(
        &self,
        cancel: &CancellationToken,
        qid: i64,
        tid: i64,
        weight: i64,
    ) -> Result<(), RepositoryError>;

    /// Store a freshly computed hot value. Does not touch the modify time.
    async fn update_hot_value(
        &self,
        cancel: &CancellationToken,
        qid: i64,
        hot_value: i64,
        fresh_time: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Delete a question with its answers. Silent when missing.
    async fn delete_question_by_id(
        &self,
        cancel: &CancellationToken,
        qid: i64,
    ) -> Result<(), RepositoryError>;
}
