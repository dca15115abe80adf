//! `SQLite` implementation of the `CollectRepository` trait.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use aibot_core::{CachePool, CollectRepository, RepositoryError};

use super::base::{Entity, RepositoryBase, guarded};
use super::toggle::{Association, AssociationKind, Target, TargetKind, ToggleStore};

/// `SQLite` implementation of the `CollectRepository` trait.
pub struct SqliteCollectRepository {
    store: ToggleStore,
}

impl SqliteCollectRepository {
    pub fn new(pool: SqlitePool, cache: Arc<dyn CachePool>) -> Self {
        Self {
            store: ToggleStore::new(RepositoryBase::new(pool, cache)),
        }
    }

    /// Whether any of the user's folders holds `target`.
    async fn user_collected(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        target: Target,
    ) -> Result<bool, RepositoryError> {
        let base = self.store.base();
        base.require(cancel, Entity::User(uid)).await?;

        let sql = match target {
            Target::Question(qid) => {
                base.require(cancel, Entity::Question(qid)).await?;
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM collect_questions c
                    JOIN favorites f ON f.favorite_id = c.favorite_id
                    WHERE f.user_id = ? AND c.question_id = ?
                )
                "#
            }
            Target::Answer(aid) => {
                base.require(cancel, Entity::Answer(aid)).await?;
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM collect_answers c
                    JOIN favorites f ON f.favorite_id = c.favorite_id
                    WHERE f.user_id = ? AND c.answer_id = ?
                )
                "#
            }
        };
        let id = match target {
            Target::Question(id) | Target::Answer(id) => id,
        };

        let found: i64 = guarded(
            cancel,
            sqlx::query_scalar(sql)
                .bind(uid)
                .bind(id)
                .fetch_one(base.pool()),
        )
        .await?;
        Ok(found != 0)
    }
}

#[async_trait]
impl CollectRepository for SqliteCollectRepository {
    async fn select_collected_questions(
        &self,
        cancel: &CancellationToken,
        fid: i64,
    ) -> Result<Option<Vec<i64>>, RepositoryError> {
        self.store
            .targets_of_owner(cancel, AssociationKind::Collect, fid, TargetKind::Question)
            .await
    }

    async fn select_collected_answers(
        &self,
        cancel: &CancellationToken,
        fid: i64,
    ) -> Result<Option<Vec<i64>>, RepositoryError> {
        self.store
            .targets_of_owner(cancel, AssociationKind::Collect, fid, TargetKind::Answer)
            .await
    }

    async fn select_collects_count_for_question(
        &self,
        cancel: &CancellationToken,
        qid: i64,
    ) -> Result<i64, RepositoryError> {
        self.store
            .count_for_target(cancel, AssociationKind::Collect, Target::Question(qid), None)
            .await
    }

    async fn select_collects_count_for_answer(
        &self,
        cancel: &CancellationToken,
        aid: i64,
    ) -> Result<i64, RepositoryError> {
        self.store
            .count_for_target(cancel, AssociationKind::Collect, Target::Answer(aid), None)
            .await
    }

    async fn favorite_collected_question(
        &self,
        cancel: &CancellationToken,
        fid: i64,
        qid: i64,
    ) -> Result<bool, RepositoryError> {
        self.store
            .is_on(cancel, Association::collect(fid, Target::Question(qid)))
            .await
    }

    async fn favorite_collected_answer(
        &self,
        cancel: &CancellationToken,
        fid: i64,
        aid: i64,
    ) -> Result<bool, RepositoryError> {
        self.store
            .is_on(cancel, Association::collect(fid, Target::Answer(aid)))
            .await
    }

    async fn user_collected_question(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        qid: i64,
    ) -> Result<bool, RepositoryError> {
        self.user_collected(cancel, uid, Target::Question(qid)).await
    }

    async fn user_collected_answer(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        aid: i64,
    ) -> Result<bool, RepositoryError> {
        self.user_collected(cancel, uid, Target::Answer(aid)).await
    }

    async fn insert_collect_for_question(
        &self,
        cancel: &CancellationToken,
        fid: i64,
        qid: i64,
    ) -> Result<(), RepositoryError> {
        self.store
            .turn_on(cancel, Association::collect(fid, Target::Question(qid)))
            .await
    }

    async fn insert_collect_for_answer(
        &self,
        cancel: &CancellationToken,
        fid: i64,
        aid: i64,
    ) -> Result<(), RepositoryError> {
        self.store
            .turn_on(cancel, Association::collect(fid, Target::Answer(aid)))
            .await
    }

    async fn delete_collect_for_question(
        &self,
        cancel: &CancellationToken,
        fid: i64,
        qid: i64,
    ) -> Result<(), RepositoryError> {
        self.store
            .turn_off(cancel, Association::collect(fid, Target::Question(qid)))
            .await
    }

    async fn delete_collect_for_answer(
        &self,
        cancel: &CancellationToken,
        fid: i64,
        aid: i64,
    ) -> Result<(), RepositoryError> {
        self.store
            .turn_off(cancel, Association::collect(fid, Target::Answer(aid)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use aibot_core::FavoriteRepository;
    use tokio_test::assert_ok;

    use super::*;
    use crate::factory::TestDb;

    #[tokio::test]
    async fn test_toggle_collects() {
        let db = TestDb::new().await.unwrap();
        let repo = db.collect_repository();
        let cancel = CancellationToken::new();
        let uid = db.seed_user("collector").await.unwrap();
        let fid = db.seed_favorite(uid, "reading").await.unwrap();
        let q1 = db.seed_question(uid, "1", &[]).await.unwrap();
        let q2 = db.seed_question(uid, "2", &[]).await.unwrap();

        assert_eq!(
            repo.select_collected_questions(&cancel, fid).await.unwrap(),
            Some(vec![])
        );
        assert_ok!(repo.insert_collect_for_question(&cancel, fid, q2).await);
        assert_ok!(repo.insert_collect_for_question(&cancel, fid, q1).await);
        assert_eq!(
            repo.insert_collect_for_question(&cancel, fid, q1).await,
            Err(RepositoryError::FavoriteHasCollectedTarget {
                fid,
                target: q1
            })
        );
        assert_eq!(
            repo.select_collected_questions(&cancel, fid).await.unwrap(),
            Some(vec![q2, q1])
        );
        assert!(repo.favorite_collected_question(&cancel, fid, q1).await.unwrap());
        assert_eq!(
            repo.select_collects_count_for_question(&cancel, q1)
                .await
                .unwrap(),
            1
        );

        assert_ok!(repo.delete_collect_for_question(&cancel, fid, q1).await);
        assert_eq!(
            repo.delete_collect_for_question(&cancel, fid, q1).await,
            Err(RepositoryError::FavoriteNotCollectedTarget {
                fid,
                target: q1
            })
        );
        assert!(!repo.favorite_collected_question(&cancel, fid, q1).await.unwrap());
    }

    #[tokio::test]
    async fn test_user_collected_spans_folders() {
        let db = TestDb::new().await.unwrap();
        let repo = db.collect_repository();
        let cancel = CancellationToken::new();
        let uid = db.seed_user("collector").await.unwrap();
        let other = db.seed_user("other").await.unwrap();
        let _empty = db.seed_favorite(uid, "empty").await.unwrap();
        let fid = db.seed_favorite(uid, "answers").await.unwrap();
        let qid = db.seed_question(other, "q", &[]).await.unwrap();
        let aid = db.seed_answer(other, qid).await.unwrap();

        repo.insert_collect_for_answer(&cancel, fid, aid).await.unwrap();
        assert!(repo.user_collected_answer(&cancel, uid, aid).await.unwrap());
        assert!(!repo.user_collected_answer(&cancel, other, aid).await.unwrap());
        assert!(!repo.user_collected_question(&cancel, uid, qid).await.unwrap());
        assert_eq!(
            repo.select_collects_count_for_answer(&cancel, aid).await.unwrap(),
            1
        );
        assert_eq!(
            repo.select_collected_answers(&cancel, fid).await.unwrap(),
            Some(vec![aid])
        );
    }

    #[tokio::test]
    async fn test_missing_references() {
        let db = TestDb::new().await.unwrap();
        let repo = db.collect_repository();
        let cancel = CancellationToken::new();
        let uid = db.seed_user("collector").await.unwrap();
        let fid = db.seed_favorite(uid, "f").await.unwrap();
        let qid = db.seed_question(uid, "q", &[]).await.unwrap();

        assert_eq!(
            repo.insert_collect_for_question(&cancel, fid + 1, qid + 1).await,
            Err(RepositoryError::FavoriteNotExist(fid + 1))
        );
        assert_eq!(
            repo.insert_collect_for_answer(&cancel, fid, 77).await,
            Err(RepositoryError::AnswerNotExist(77))
        );
        assert_eq!(
            repo.user_collected_question(&cancel, uid + 1, qid).await,
            Err(RepositoryError::UserNotExist(uid + 1))
        );
        assert_eq!(
            repo.user_collected_question(&cancel, uid, qid + 1).await,
            Err(RepositoryError::QuestionNotExist(qid + 1))
        );
        assert_eq!(
            repo.select_collected_answers(&cancel, fid + 1).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_deleting_folder_drops_collects() {
        let db = TestDb::new().await.unwrap();
        let repo = db.collect_repository();
        let cancel = CancellationToken::new();
        let uid = db.seed_user("collector").await.unwrap();
        let fid = db.seed_favorite(uid, "f").await.unwrap();
        let qid = db.seed_question(uid, "q", &[]).await.unwrap();
        repo.insert_collect_for_question(&cancel, fid, qid)
            .await
            .unwrap();

        db.favorite_repository()
            .delete_favorite_by_id(&cancel, fid)
            .await
            .unwrap();
        assert_eq!(
            repo.select_collects_count_for_question(&cancel, qid)
                .await
                .unwrap(),
            0
        );
        assert!(!repo.user_collected_question(&cancel, uid, qid).await.unwrap());
    }
}
