//! `SQLite` implementation of the `AnswerRepository` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use aibot_core::{
    AnswerInfo, AnswerRepository, CacheKey, CachePool, CacheRegion, NewAnswer, RepositoryError,
};

use super::base::{ChangeSet, Entity, RepositoryBase, guarded};
use super::row_mappers::{ANSWER_SELECT_COLUMNS, AnswerRow};

/// `SQLite` implementation of the `AnswerRepository` trait.
pub struct SqliteAnswerRepository {
    base: RepositoryBase,
}

impl SqliteAnswerRepository {
    pub fn new(pool: SqlitePool, cache: Arc<dyn CachePool>) -> Self {
        Self {
            base: RepositoryBase::new(pool, cache),
        }
    }

    async fn answer_of(
        &self,
        cancel: &CancellationToken,
        qid: i64,
        uid: i64,
    ) -> Result<Option<i64>, RepositoryError> {
        guarded(
            cancel,
            sqlx::query_scalar("SELECT answer_id FROM answers WHERE question_id = ? AND user_id = ?")
                .bind(qid)
                .bind(uid)
                .fetch_optional(self.base.pool()),
        )
        .await
    }

    async fn question_of(
        &self,
        cancel: &CancellationToken,
        aid: i64,
    ) -> Result<Option<i64>, RepositoryError> {
        guarded(
            cancel,
            sqlx::query_scalar("SELECT question_id FROM answers WHERE answer_id = ?")
                .bind(aid)
                .fetch_optional(self.base.pool()),
        )
        .await
    }

    fn invalidate(&self, aid: i64, qid: Option<i64>) {
        let cache = self.base.cache();
        cache.invalidate(&CacheKey::new(CacheRegion::Answer, aid));
        if let Some(qid) = qid {
            cache.invalidate(&CacheKey::new(CacheRegion::Question, qid));
        }
    }
}

#[async_trait]
impl AnswerRepository for SqliteAnswerRepository {
    async fn select_answer_by_id(
        &self,
        cancel: &CancellationToken,
        aid: i64,
    ) -> Result<Option<AnswerInfo>, RepositoryError> {
        let key = CacheKey::new(CacheRegion::Answer, aid);
        if let Some(answer) = self.base.cached::<AnswerInfo>(cancel, &key)? {
            return Ok(Some(answer));
        }

        let sql = format!("SELECT {ANSWER_SELECT_COLUMNS} FROM answers WHERE answer_id = ?");
        let row: Option<AnswerRow> = guarded(
            cancel,
            sqlx::query_as(&sql).bind(aid).fetch_optional(self.base.pool()),
        )
        .await?;

        let answer = row.map(AnswerInfo::from);
        if let Some(answer) = &answer {
            self.base.cache().put(key, answer.clone());
        }
        Ok(answer)
    }

    async fn select_answer_by_question_and_user(
        &self,
        cancel: &CancellationToken,
        qid: i64,
        uid: i64,
    ) -> Result<Option<i64>, RepositoryError> {
        self.base.require(cancel, Entity::Question(qid)).await?;
        self.base.require(cancel, Entity::User(uid)).await?;
        self.answer_of(cancel, qid, uid).await
    }

    async fn insert_answer(
        &self,
        cancel: &CancellationToken,
        answer: &NewAnswer,
    ) -> Result<i64, RepositoryError> {
        let (uid, qid) = (answer.user_id, answer.question_id);
        let now = Utc::now();
        let mut changes = ChangeSet::new();
        changes
            .insert(
                r#"
                INSERT INTO answers (user_id, question_id, content, create_time, modify_time)
                VALUES (?, ?, ?, ?, ?)
                "#,
                vec![
                    uid.into(),
                    qid.into(),
                    answer.content.as_str().into(),
                    now.into(),
                    now.into(),
                ],
            )
            .execute_expecting(
                "UPDATE questions SET modify_time = ? WHERE question_id = ?",
                vec![now.into(), qid.into()],
                1,
            );

        loop {
            self.base.require(cancel, Entity::User(uid)).await?;
            self.base.require(cancel, Entity::Question(qid)).await?;
            if self.answer_of(cancel, qid, uid).await?.is_some() {
                return Err(RepositoryError::UserHasAnsweredQuestion { uid, qid });
            }
            match self.base.try_save_once(cancel, &changes).await? {
                Ok(receipt) => {
                    self.base
                        .cache()
                        .invalidate(&CacheKey::new(CacheRegion::Question, qid));
                    return receipt.require_inserted_id();
                }
                Err(conflict) => {
                    tracing::debug!(?conflict, uid, qid, "insert_answer conflicted, rechecking");
                }
            }
        }
    }

    async fn update_answer(
        &self,
        cancel: &CancellationToken,
        aid: i64,
        content: &str,
    ) -> Result<(), RepositoryError> {
        let mut changes = ChangeSet::new();
        changes.execute_expecting(
            "UPDATE answers SET content = ?, modify_time = ? WHERE answer_id = ?",
            vec![content.into(), Utc::now().into(), aid.into()],
            1,
        );

        loop {
            self.base.require(cancel, Entity::Answer(aid)).await?;
            match self.base.try_save_once(cancel, &changes).await? {
                Ok(_) => {
                    self.invalidate(aid, None);
                    return Ok(());
                }
                Err(conflict) => {
                    tracing::debug!(?conflict, aid, "update_answer conflicted, rechecking");
                }
            }
        }
    }

    async fn delete_answer_by_id(
        &self,
        cancel: &CancellationToken,
        aid: i64,
    ) -> Result<(), RepositoryError> {
        let qid = self.question_of(cancel, aid).await?;

        let mut changes = ChangeSet::new();
        changes.execute("DELETE FROM answers WHERE answer_id = ?", vec![aid.into()]);
        self.base.save(cancel, &changes).await?;

        // The question may have pointed at this answer as its best one.
        self.invalidate(aid, qid);
        Ok(())
    }
}
