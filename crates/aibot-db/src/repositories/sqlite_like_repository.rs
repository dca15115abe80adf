//! `SQLite` implementation of the `LikeRepository` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use aibot_core::{CachePool, LikeRepository, RepositoryError};

use super::base::RepositoryBase;
use super::toggle::{Association, AssociationKind, Target, TargetKind, ToggleStore};

/// `SQLite` implementation of the `LikeRepository` trait.
pub struct SqliteLikeRepository {
    store: ToggleStore,
}

impl SqliteLikeRepository {
    pub fn new(pool: SqlitePool, cache: Arc<dyn CachePool>) -> Self {
        Self {
            store: ToggleStore::new(RepositoryBase::new(pool, cache)),
        }
    }
}

#[async_trait]
impl LikeRepository for SqliteLikeRepository {
    async fn select_liked_questions_for_user(
        &self,
        cancel: &CancellationToken,
        uid: i64,
    ) -> Result<Option<Vec<i64>>, RepositoryError> {
        self.store
            .targets_of_owner(cancel, AssociationKind::Like, uid, TargetKind::Question)
            .await
    }

    async fn select_liked_answers_for_user(
        &self,
        cancel: &CancellationToken,
        uid: i64,
    ) -> Result<Option<Vec<i64>>, RepositoryError> {
        self.store
            .targets_of_owner(cancel, AssociationKind::Like, uid, TargetKind::Answer)
            .await
    }

    async fn select_likes_count_for_question(
        &self,
        cancel: &CancellationToken,
        qid: i64,
    ) -> Result<i64, RepositoryError> {
        self.store
            .count_for_target(cancel, AssociationKind::Like, Target::Question(qid), None)
            .await
    }

    async fn select_likes_count_for_answer(
        &self,
        cancel: &CancellationToken,
        aid: i64,
    ) -> Result<i64, RepositoryError> {
        self.store
            .count_for_target(cancel, AssociationKind::Like, Target::Answer(aid), None)
            .await
    }

    async fn select_likes_count_for_question_after_time(
        &self,
        cancel: &CancellationToken,
        qid: i64,
        start: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        self.store
            .count_for_target(
                cancel,
                AssociationKind::Like,
                Target::Question(qid),
                Some(start),
            )
            .await
    }

    async fn select_likes_count_for_answer_after_time(
        &self,
        cancel: &CancellationToken,
        aid: i64,
        start: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        self.store
            .count_for_target(cancel, AssociationKind::Like, Target::Answer(aid), Some(start))
            .await
    }

    async fn user_liked_question(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        qid: i64,
    ) -> Result<bool, RepositoryError> {
        self.store
            .is_on(cancel, Association::like(uid, Target::Question(qid)))
            .await
    }

    async fn user_liked_answer(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        aid: i64,
    ) -> Result<bool, RepositoryError> {
        self.store
            .is_on(cancel, Association::like(uid, Target::Answer(aid)))
            .await
    }

    async fn insert_like_for_question(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        qid: i64,
    ) -> Result<(), RepositoryError> {
        self.store
            .turn_on(cancel, Association::like(uid, Target::Question(qid)))
            .await
    }

    async fn insert_like_for_answer(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        aid: i64,
    ) -> Result<(), RepositoryError> {
        self.store
            .turn_on(cancel, Association::like(uid, Target::Answer(aid)))
            .await
    }

    async fn delete_like_for_question(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        qid: i64,
    ) -> Result<(), RepositoryError> {
        self.store
            .turn_off(cancel, Association::like(uid, Target::Question(qid)))
            .await
    }

    async fn delete_like_for_answer(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        aid: i64,
    ) -> Result<(), RepositoryError> {
        self.store
            .turn_off(cancel, Association::like(uid, Target::Answer(aid)))
            .await
    }
}
