//! `SQLite` implementation of the `QuestionRepository` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use aibot_core::utils::validation::check_question_title;
use aibot_core::{
    CacheKey, CachePool, CacheRegion, NewQuestion, QuestionInfo, QuestionRepository, QuestionTag,
    QuestionUpdate, RepositoryError,
};

use super::base::{ChangeSet, Entity, RepositoryBase, SqlValue, guarded};
use super::row_mappers::{QUESTION_SELECT_COLUMNS, QuestionRow, QuestionTagRow};

/// `SQLite` implementation of the `QuestionRepository` trait.
pub struct SqliteQuestionRepository {
    base: RepositoryBase,
}

/// Sorted, de-duplicated tag ids.
fn distinct(tags: &[i64]) -> Vec<i64> {
    let mut tags = tags.to_vec();
    tags.sort_unstable();
    tags.dedup();
    tags
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

impl SqliteQuestionRepository {
    pub fn new(pool: SqlitePool, cache: Arc<dyn CachePool>) -> Self {
        Self {
            base: RepositoryBase::new(pool, cache),
        }
    }

    async fn require_tags(
        &self,
        cancel: &CancellationToken,
        tags: &[i64],
    ) -> Result<(), RepositoryError> {
        for &tid in tags {
            self.base.require(cancel, Entity::Tag(tid)).await?;
        }
        Ok(())
    }

    /// The best answer must be an answer of this very question.
    async fn require_answer_of(
        &self,
        cancel: &CancellationToken,
        qid: i64,
        aid: i64,
    ) -> Result<(), RepositoryError> {
        let owner: Option<i64> = guarded(
            cancel,
            sqlx::query_scalar("SELECT question_id FROM answers WHERE answer_id = ?")
                .bind(aid)
                .fetch_optional(self.base.pool()),
        )
        .await?;
        if owner == Some(qid) {
            Ok(())
        } else {
            Err(RepositoryError::AnswerNotExist(aid))
        }
    }

    async fn tag_attached(
        &self,
        cancel: &CancellationToken,
        qid: i64,
        tid: i64,
    ) -> Result<bool, RepositoryError> {
        let found: i64 = guarded(
            cancel,
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM question_tags WHERE question_id = ? AND tag_id = ?)",
            )
            .bind(qid)
            .bind(tid)
            .fetch_one(self.base.pool()),
        )
        .await?;
        Ok(found != 0)
    }

    fn invalidate(&self, qid: i64) {
        self.base
            .cache()
            .invalidate(&CacheKey::new(CacheRegion::Question, qid));
    }
}

#[async_trait]
impl QuestionRepository for SqliteQuestionRepository {
    async fn select_question_by_id(
        &self,
        cancel: &CancellationToken,
        qid: i64,
    ) -> Result<Option<QuestionInfo>, RepositoryError> {
        let key = CacheKey::new(CacheRegion::Question, qid);
        if let Some(question) = self.base.cached::<QuestionInfo>(cancel, &key)? {
            return Ok(Some(question));
        }

        let sql = format!("SELECT {QUESTION_SELECT_COLUMNS} FROM questions WHERE question_id = ?");
        let row: Option<QuestionRow> = guarded(
            cancel,
            sqlx::query_as(&sql).bind(qid).fetch_optional(self.base.pool()),
        )
        .await?;

        let question = row.map(QuestionInfo::from);
        if let Some(question) = &question {
            self.base.cache().put(key, question.clone());
        }
        Ok(question)
    }

    async fn select_answers_for_question_by_id(
        &self,
        cancel: &CancellationToken,
        qid: i64,
    ) -> Result<Option<Vec<i64>>, RepositoryError> {
        let rows: Vec<i64> = guarded(
            cancel,
            sqlx::query_scalar(
                "SELECT answer_id FROM answers WHERE question_id = ? ORDER BY answer_id",
            )
            .bind(qid)
            .fetch_all(self.base.pool()),
        )
        .await?;
        self.base
            .non_empty_or_parent(cancel, rows, Entity::Question(qid))
            .await
    }

    async fn select_tags_for_question_by_id(
        &self,
        cancel: &CancellationToken,
        qid: i64,
    ) -> Result<Option<Vec<QuestionTag>>, RepositoryError> {
        let rows: Vec<QuestionTagRow> = guarded(
            cancel,
            sqlx::query_as(
                r#"
                SELECT t.tag_id, t.name, t.category, qt.weight
                FROM question_tags qt
                JOIN tags t ON t.tag_id = qt.tag_id
                WHERE qt.question_id = ?
                ORDER BY qt.weight DESC, t.tag_id
                "#,
            )
            .bind(qid)
            .fetch_all(self.base.pool()),
        )
        .await?;
        let tags = rows
            .into_iter()
            .map(QuestionTag::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        self.base
            .non_empty_or_parent(cancel, tags, Entity::Question(qid))
            .await
    }

    async fn select_questions_by_tags(
        &self,
        cancel: &CancellationToken,
        tags: &[i64],
        page_size: u32,
        page: u32,
    ) -> Result<Vec<i64>, RepositoryError> {
        let tags = distinct(tags);
        self.require_tags(cancel, &tags).await?;
        if page_size == 0 {
            return Ok(Vec::new());
        }

        let filter = if tags.is_empty() {
            String::new()
        } else {
            format!(
                "WHERE (SELECT COUNT(*) FROM question_tags qt WHERE qt.question_id = q.question_id AND qt.tag_id IN ({})) = ?",
                placeholders(tags.len())
            )
        };
        let sql = format!(
            "SELECT q.question_id FROM questions q {filter} ORDER BY q.modify_time DESC, q.question_id DESC LIMIT ? OFFSET ?"
        );

        let mut query = sqlx::query_scalar(&sql);
        for &tid in &tags {
            query = query.bind(tid);
        }
        if !tags.is_empty() {
            query = query.bind(i64::try_from(tags.len()).unwrap_or(i64::MAX));
        }
        let offset = i64::from(page_size) * i64::from(page);
        query = query.bind(i64::from(page_size)).bind(offset);

        guarded(cancel, query.fetch_all(self.base.pool())).await
    }

    async fn select_hottest_questions(
        &self,
        cancel: &CancellationToken,
        limit: u32,
    ) -> Result<Vec<i64>, RepositoryError> {
        guarded(
            cancel,
            sqlx::query_scalar(
                "SELECT question_id FROM questions ORDER BY hot_value DESC, modify_time DESC LIMIT ?",
            )
            .bind(i64::from(limit))
            .fetch_all(self.base.pool()),
        )
        .await
    }

    async fn insert_question(
        &self,
        cancel: &CancellationToken,
        question: &NewQuestion,
    ) -> Result<i64, RepositoryError> {
        check_question_title(&question.title)?;
        let tags = distinct(&question.tags);

        let now = Utc::now();
        let mut changes = ChangeSet::new();
        changes.insert(
            r#"
            INSERT INTO questions (user_id, title, remarks, create_time, modify_time, hot_value, hot_fresh_time)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            "#,
            vec![
                question.user_id.into(),
                question.title.as_str().into(),
                question.remarks.as_str().into(),
                now.into(),
                now.into(),
                now.into(),
            ],
        );
        for &tid in &tags {
            changes.execute(
                "INSERT INTO question_tags (question_id, tag_id, weight) VALUES (?, ?, 1)",
                vec![SqlValue::InsertedId, tid.into()],
            );
        }

        loop {
            self.base
                .require(cancel, Entity::User(question.user_id))
                .await?;
            self.require_tags(cancel, &tags).await?;
            match self.base.try_save_once(cancel, &changes).await? {
                Ok(receipt) => return receipt.require_inserted_id(),
                Err(conflict) => {
                    tracing::debug!(?conflict, "insert_question conflicted, rechecking");
                }
            }
        }
    }

    async fn update_question(
        &self,
        cancel: &CancellationToken,
        qid: i64,
        update: &QuestionUpdate,
    ) -> Result<(), RepositoryError> {
        if let Some(title) = &update.title {
            check_question_title(title)?;
        }
        if update.is_empty() {
            return self.base.require(cancel, Entity::Question(qid)).await;
        }

        let mut sets = vec!["modify_time = ?"];
        let mut values: Vec<SqlValue> = vec![Utc::now().into()];
        if let Some(title) = &update.title {
            sets.push("title = ?");
            values.push(title.as_str().into());
        }
        if let Some(remarks) = &update.remarks {
            sets.push("remarks = ?");
            values.push(remarks.as_str().into());
        }
        if let Some(best_answer) = update.best_answer {
            sets.push("best_answer = ?");
            values.push(best_answer.into());
        }
        values.push(qid.into());

        let mut changes = ChangeSet::new();
        changes.execute_expecting(
            format!("UPDATE questions SET {} WHERE question_id = ?", sets.join(", ")),
            values,
            1,
        );

        let tags = update.tags.as_deref().map(distinct);
        match tags.as_deref() {
            None => {}
            Some([]) => {
                changes.execute(
                    "DELETE FROM question_tags WHERE question_id = ?",
                    vec![qid.into()],
                );
            }
            Some(tags) => {
                let mut values: Vec<SqlValue> = vec![qid.into()];
                values.extend(tags.iter().map(|&tid| SqlValue::from(tid)));
                changes.execute(
                    format!(
                        "DELETE FROM question_tags WHERE question_id = ? AND tag_id NOT IN ({})",
                        placeholders(tags.len())
                    ),
                    values,
                );
                // Kept tags retain their weight.
                for &tid in tags {
                    changes.execute(
                        "INSERT OR IGNORE INTO question_tags (question_id, tag_id, weight) VALUES (?, ?, 1)",
                        vec![qid.into(), tid.into()],
                    );
                }
            }
        }

        loop {
            self.base.require(cancel, Entity::Question(qid)).await?;
            if let Some(Some(aid)) = update.best_answer {
                self.require_answer_of(cancel, qid, aid).await?;
            }
            if let Some(tags) = &tags {
                self.require_tags(cancel, tags).await?;
            }
            match self.base.try_save_once(cancel, &changes).await? {
                Ok(_) => {
                    self.invalidate(qid);
                    return Ok(());
                }
                Err(conflict) => {
                    tracing::debug!(?conflict, qid, "update_question conflicted, rechecking");
                }
            }
        }
    }

    async fn update_tag_weight(
        &self,
        cancel: &CancellationToken,
        qid: i64,
        tid: i64,
        weight: i64,
    ) -> Result<(), RepositoryError> {
        let mut changes = ChangeSet::new();
        changes.execute_expecting(
            "UPDATE question_tags SET weight = ? WHERE question_id = ? AND tag_id = ?",
            vec![weight.into(), qid.into(), tid.into()],
            1,
        );

        loop {
            self.base.require(cancel, Entity::Question(qid)).await?;
            self.base.require(cancel, Entity::Tag(tid)).await?;
            if !self.tag_attached(cancel, qid, tid).await? {
                return Err(RepositoryError::TagNotExist(tid));
            }
            match self.base.try_save_once(cancel, &changes).await? {
                Ok(_) => return Ok(()),
                Err(conflict) => {
                    tracing::debug!(
                        ?conflict,
                        qid,
                        tid,
                        "update_tag_weight conflicted, rechecking"
                    );
                }
            }
        }
    }

    async fn update_hot_value(
        &self,
        cancel: &CancellationToken,
        qid: i64,
        hot_value: i64,
        fresh_time: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut changes = ChangeSet::new();
        changes.execute_expecting(
            "UPDATE questions SET hot_value = ?, hot_fresh_time = ? WHERE question_id = ?",
            vec![hot_value.into(), fresh_time.into(), qid.into()],
            1,
        );

        loop {
            self.base.require(cancel, Entity::Question(qid)).await?;
            match self.base.try_save_once(cancel, &changes).await? {
                Ok(_) => {
                    self.invalidate(qid);
                    return Ok(());
                }
                Err(conflict) => {
                    tracing::debug!(?conflict, qid, "update_hot_value conflicted, rechecking");
                }
            }
        }
    }

    async fn delete_question_by_id(
        &self,
        cancel: &CancellationToken,
        qid: i64,
    ) -> Result<(), RepositoryError> {
        let answers: Vec<i64> = guarded(
            cancel,
            sqlx::query_scalar("SELECT answer_id FROM answers WHERE question_id = ?")
                .bind(qid)
                .fetch_all(self.base.pool()),
        )
        .await?;

        let mut changes = ChangeSet::new();
        changes.execute("DELETE FROM questions WHERE question_id = ?", vec![qid.into()]);
        self.base.save(cancel, &changes).await?;

        self.invalidate(qid);
        for aid in answers {
            self.base
                .cache()
                .invalidate(&CacheKey::new(CacheRegion::Answer, aid));
        }
        Ok(())
    }
}
