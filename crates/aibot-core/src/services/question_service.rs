//! Question service - assembles the question/answer views.

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::contracts::{AnswerInformation, QuestionInformation, QuestionModifyItems, TagInformation};
use crate::ports::{Repos, RepositoryError};

/// Service for reading and modifying questions as the API layer sees them.
///
/// A missing row yields `Ok(None)`. Viewer-relative flags are `None`
/// when no viewer is given.
pub struct QuestionService {
    repos: Repos,
}

impl QuestionService {
    pub const fn new(repos: Repos) -> Self {
        Self { repos }
    }

    /// Build the full view of a question.
    pub async fn question_information(
        &self,
        cancel: &CancellationToken,
        qid: i64,
        viewer: Option<i64>,
    ) -> Result<Option<QuestionInformation>, RepositoryError> {
        let Some(question) = self.repos.questions.select_question_by_id(cancel, qid).await? else {
            return Ok(None);
        };

        let tags = self
            .repos
            .questions
            .select_tags_for_question_by_id(cancel, qid)
            .await?
            .unwrap_or_default()
            .into_iter()
            .map(|tag| (tag.name, tag.tag_id))
            .collect();
        let answers = self
            .repos
            .questions
            .select_answers_for_question_by_id(cancel, qid)
            .await?
            .unwrap_or_default();

        let like_num = self.repos.likes.select_likes_count_for_question(cancel, qid).await?;
        let collect_num = self
            .repos
            .collects
            .select_collects_count_for_question(cancel, qid)
            .await?;

        let (like, collected) = match viewer {
            Some(uid) => (
                Some(self.repos.likes.user_liked_question(cancel, uid, qid).await?),
                Some(self.repos.collects.user_collected_question(cancel, uid, qid).await?),
            ),
            None => (None, None),
        };

        Ok(Some(QuestionInformation {
            title: question.title,
            remarks: question.remarks,
            creator: question.user_id,
            like,
            like_num,
            collected,
            collect_num,
            best_answer: question.best_answer,
            hot_value: question.hot_value,
            hot_fresh_time: question.hot_fresh_time,
            create_time: question.create_time,
            modify_time: question.modify_time,
            tags,
            answers,
        }))
    }

    /// Build the full view of an answer.
    pub async fn answer_information(
        &self,
        cancel: &CancellationToken,
        aid: i64,
        viewer: Option<i64>,
    ) -> Result<Option<AnswerInformation>, RepositoryError> {
        let Some(answer) = self.repos.answers.select_answer_by_id(cancel, aid).await? else {
            return Ok(None);
        };

        let like_num = self.repos.likes.select_likes_count_for_answer(cancel, aid).await?;
        let collect_num = self
            .repos
            .collects
            .select_collects_count_for_answer(cancel, aid)
            .await?;

        let (like, collected) = match viewer {
            Some(uid) => (
                Some(self.repos.likes.user_liked_answer(cancel, uid, aid).await?),
                Some(self.repos.collects.user_collected_answer(cancel, uid, aid).await?),
            ),
            None => (None, None),
        };

        Ok(Some(AnswerInformation {
            content: answer.content,
            creator: answer.user_id,
            question_id: answer.question_id,
            like,
            like_num,
            collected,
            collect_num,
            create_time: answer.create_time,
            modify_time: answer.modify_time,
        }))
    }

    pub async fn tag_information(
        &self,
        cancel: &CancellationToken,
        tid: i64,
    ) -> Result<Option<TagInformation>, RepositoryError> {
        Ok(self
            .repos
            .tags
            .select_tag_by_id(cancel, tid)
            .await?
            .map(|tag| TagInformation {
                category: tag.category,
                name: tag.name,
                desc: tag.desc,
            }))
    }

    /// Apply a modification request to a question.
    pub async fn modify_question(
        &self,
        cancel: &CancellationToken,
        qid: i64,
        items: QuestionModifyItems,
    ) -> Result<(), RepositoryError> {
        self.repos
            .questions
            .update_question(cancel, qid, &items.into())
            .await
    }

    /// Recompute and store a question's hot value.
    ///
    /// The hot value is the number of likes received since `window_start`
    /// plus the number of answers. Returns the stored value.
    pub async fn refresh_hot_value(
        &self,
        cancel: &CancellationToken,
        qid: i64,
        window_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let recent_likes = self
            .repos
            .likes
            .select_likes_count_for_question_after_time(cancel, qid, window_start)
            .await?;
        let answers = self
            .repos
            .questions
            .select_answers_for_question_by_id(cancel, qid)
            .await?
            .ok_or(RepositoryError::QuestionNotExist(qid))?;

        let hot_value = recent_likes + i64::try_from(answers.len()).unwrap_or(i64::MAX);
        self.repos
            .questions
            .update_hot_value(cancel, qid, hot_value, now)
            .await?;
        tracing::debug!(qid, hot_value, "refreshed hot value");
        Ok(hot_value)
    }
}
