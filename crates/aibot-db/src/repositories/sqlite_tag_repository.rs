//! `SQLite` implementation of the `TagRepository` trait.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use aibot_core::utils::validation::check_tag_name;
use aibot_core::{
    CacheKey, CachePool, CacheRegion, NewTag, RepositoryError, TagCategory, TagInfo,
    TagRepository, TagUpdate,
};

use super::base::{ChangeSet, Entity, RepositoryBase, SqlValue, guarded};
use super::row_mappers::{TAG_SELECT_COLUMNS, TagRow};

/// `SQLite` implementation of the `TagRepository` trait.
pub struct SqliteTagRepository {
    base: RepositoryBase,
}

impl SqliteTagRepository {
    pub fn new(pool: SqlitePool, cache: Arc<dyn CachePool>) -> Self {
        Self {
            base: RepositoryBase::new(pool, cache),
        }
    }

    /// Uncached read, used for pre-write checks.
    async fn load(
        &self,
        cancel: &CancellationToken,
        tid: i64,
    ) -> Result<Option<TagInfo>, RepositoryError> {
        let sql = format!("SELECT {TAG_SELECT_COLUMNS} FROM tags WHERE tag_id = ?");
        let row: Option<TagRow> = guarded(
            cancel,
            sqlx::query_as(&sql).bind(tid).fetch_optional(self.base.pool()),
        )
        .await?;
        row.map(TagInfo::try_from).transpose()
    }

    /// Fail with `TagNameHasExist` when another tag already uses the name
    /// within the category.
    async fn check_unique(
        &self,
        cancel: &CancellationToken,
        category: TagCategory,
        name: &str,
        except: Option<i64>,
    ) -> Result<(), RepositoryError> {
        let taken: i64 = guarded(
            cancel,
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM tags WHERE category = ? AND name = ? AND tag_id IS NOT ?)",
            )
            .bind(category.as_i64())
            .bind(name)
            .bind(except)
            .fetch_one(self.base.pool()),
        )
        .await?;
        if taken == 0 {
            Ok(())
        } else {
            Err(RepositoryError::TagNameHasExist(name.to_string()))
        }
    }
}

#[async_trait]
impl TagRepository for SqliteTagRepository {
    async fn select_all_tags(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<TagInfo>, RepositoryError> {
        let sql = format!("SELECT {TAG_SELECT_COLUMNS} FROM tags ORDER BY tag_id");
        let rows: Vec<TagRow> =
            guarded(cancel, sqlx::query_as(&sql).fetch_all(self.base.pool())).await?;
        rows.into_iter().map(TagInfo::try_from).collect()
    }

    async fn select_tag_by_id(
        &self,
        cancel: &CancellationToken,
        tid: i64,
    ) -> Result<Option<TagInfo>, RepositoryError> {
        let key = CacheKey::new(CacheRegion::Tag, tid);
        if let Some(tag) = self.base.cached::<TagInfo>(cancel, &key)? {
            return Ok(Some(tag));
        }

        let tag = self.load(cancel, tid).await?;
        if let Some(tag) = &tag {
            self.base.cache().put(key, tag.clone());
        }
        Ok(tag)
    }

    async fn select_questions_id_by_tag(
        &self,
        cancel: &CancellationToken,
        tid: i64,
    ) -> Result<Option<Vec<i64>>, RepositoryError> {
        let rows: Vec<i64> = guarded(
            cancel,
            sqlx::query_scalar(
                "SELECT question_id FROM question_tags WHERE tag_id = ? ORDER BY question_id",
            )
            .bind(tid)
            .fetch_all(self.base.pool()),
        )
        .await?;
        self.base
            .non_empty_or_parent(cancel, rows, Entity::Tag(tid))
            .await
    }

    async fn insert_tag(
        &self,
        cancel: &CancellationToken,
        tag: &NewTag,
    ) -> Result<i64, RepositoryError> {
        check_tag_name(&tag.name)?;

        let mut changes = ChangeSet::new();
        changes.insert(
            "INSERT INTO tags (category, name, description) VALUES (?, ?, ?)",
            vec![
                tag.category.as_i64().into(),
                tag.name.as_str().into(),
                tag.desc.as_str().into(),
            ],
        );

        loop {
            self.check_unique(cancel, tag.category, &tag.name, None)
                .await?;
            match self.base.try_save_once(cancel, &changes).await? {
                Ok(receipt) => return receipt.require_inserted_id(),
                Err(conflict) => {
                    tracing::debug!(
                        ?conflict,
                        name = %tag.name,
                        "insert_tag conflicted, rechecking"
                    );
                }
            }
        }
    }

    async fn update_tag(
        &self,
        cancel: &CancellationToken,
        tid: i64,
        update: &TagUpdate,
    ) -> Result<(), RepositoryError> {
        if let Some(name) = &update.name {
            check_tag_name(name)?;
        }
        if update.is_empty() {
            return self.base.require(cancel, Entity::Tag(tid)).await;
        }

        let mut sets = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();
        if let Some(category) = update.category {
            sets.push("category = ?");
            values.push(category.as_i64().into());
        }
        if let Some(name) = &update.name {
            sets.push("name = ?");
            values.push(name.as_str().into());
        }
        if let Some(desc) = &update.desc {
            sets.push("description = ?");
            values.push(desc.as_str().into());
        }
        values.push(tid.into());

        let mut changes = ChangeSet::new();
        changes.execute_expecting(
            format!("UPDATE tags SET {} WHERE tag_id = ?", sets.join(", ")),
            values,
            1,
        );

        loop {
            let current = self
                .load(cancel, tid)
                .await?
                .ok_or(RepositoryError::TagNotExist(tid))?;
            let category = update.category.unwrap_or(current.category);
            let name = update.name.as_deref().unwrap_or(&current.name);
            self.check_unique(cancel, category, name, Some(tid)).await?;

            match self.base.try_save_once(cancel, &changes).await? {
                Ok(_) => {
                    self.base
                        .cache()
                        .invalidate(&CacheKey::new(CacheRegion::Tag, tid));
                    return Ok(());
                }
                Err(conflict) => {
                    tracing::debug!(?conflict, tid, "update_tag conflicted, rechecking");
                }
            }
        }
    }

    async fn delete_tag_by_id(
        &self,
        cancel: &CancellationToken,
        tid: i64,
    ) -> Result<(), RepositoryError> {
        let mut changes = ChangeSet::new();
        changes.execute("DELETE FROM tags WHERE tag_id = ?", vec![tid.into()]);
        self.base.save(cancel, &changes).await?;
        self.base
            .cache()
            .invalidate(&CacheKey::new(CacheRegion::Tag, tid));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use aibot_core::QuestionRepository;
    use tokio_test::assert_ok;

    use super::*;
    use crate::factory::TestDb;

    fn new_tag(category: TagCategory, name: &str) -> NewTag {
        NewTag {
            category,
            name: name.to_string(),
            desc: format!("about {name}"),
        }
    }

    #[tokio::test]
    async fn test_insert_and_select() {
        let db = TestDb::new().await.unwrap();
        let repo = db.tag_repository();
        let cancel = CancellationToken::new();

        let rust = repo
            .insert_tag(&cancel, &new_tag(TagCategory::Language, "rust"))
            .await
            .unwrap();
        let tokio = repo
            .insert_tag(&cancel, &new_tag(TagCategory::Library, "tokio"))
            .await
            .unwrap();

        let tag = repo.select_tag_by_id(&cancel, tokio).await.unwrap().unwrap();
        assert_eq!(tag.category, TagCategory::Library);
        assert_eq!(tag.desc, "about tokio");

        let all: Vec<i64> = repo
            .select_all_tags(&cancel)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.tag_id)
            .collect();
        assert_eq!(all, vec![rust, tokio]);
        assert_eq!(repo.select_tag_by_id(&cancel, 99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_name_unique_within_category() {
        let db = TestDb::new().await.unwrap();
        let repo = db.tag_repository();
        let cancel = CancellationToken::new();
        repo.insert_tag(&cancel, &new_tag(TagCategory::Language, "c"))
            .await
            .unwrap();

        assert_eq!(
            repo.insert_tag(&cancel, &new_tag(TagCategory::Language, "c"))
                .await,
            Err(RepositoryError::TagNameHasExist("c".to_string()))
        );
        assert_ok!(
            repo.insert_tag(&cancel, &new_tag(TagCategory::Other, "c"))
                .await
        );
        assert_eq!(
            repo.insert_tag(&cancel, &new_tag(TagCategory::Other, &"x".repeat(33)))
                .await,
            Err(RepositoryError::TagNameTooLong {
                actual: 33,
                max: 32
            })
        );
    }

    #[tokio::test]
    async fn test_update_checks_rename() {
        let db = TestDb::new().await.unwrap();
        let repo = db.tag_repository();
        let cancel = CancellationToken::new();
        let c = repo
            .insert_tag(&cancel, &new_tag(TagCategory::Language, "c"))
            .await
            .unwrap();
        let cpp = repo
            .insert_tag(&cancel, &new_tag(TagCategory::Other, "cpp"))
            .await
            .unwrap();
        repo.select_tag_by_id(&cancel, cpp).await.unwrap();

        let rename = TagUpdate {
            name: Some("c".to_string()),
            ..TagUpdate::default()
        };
        // Same name, different category: allowed.
        assert_ok!(repo.update_tag(&cancel, cpp, &rename).await);

        let recategorize = TagUpdate {
            category: Some(TagCategory::Language),
            ..TagUpdate::default()
        };
        assert_eq!(
            repo.update_tag(&cancel, cpp, &recategorize).await,
            Err(RepositoryError::TagNameHasExist("c".to_string()))
        );

        let tag = repo.select_tag_by_id(&cancel, cpp).await.unwrap().unwrap();
        assert_eq!(tag.name, "c");
        assert_eq!(tag.category, TagCategory::Other);

        // Renaming a tag to its own name is not a collision.
        let same = TagUpdate {
            name: Some("c".to_string()),
            desc: Some("the language".to_string()),
            ..TagUpdate::default()
        };
        assert_ok!(repo.update_tag(&cancel, c, &same).await);

        assert_eq!(
            repo.update_tag(&cancel, 404, &same).await,
            Err(RepositoryError::TagNotExist(404))
        );
        assert_eq!(
            repo.update_tag(&cancel, 404, &TagUpdate::default()).await,
            Err(RepositoryError::TagNotExist(404))
        );
    }

    #[tokio::test]
    async fn test_update_name_too_long_leaves_row_unchanged() {
        let db = TestDb::new().await.unwrap();
        let repo = db.tag_repository();
        let cancel = CancellationToken::new();
        let tid = repo
            .insert_tag(&cancel, &new_tag(TagCategory::Language, "rust"))
            .await
            .unwrap();

        let update = TagUpdate {
            name: Some("r".repeat(33)),
            desc: Some("never stored".to_string()),
            ..TagUpdate::default()
        };
        assert_eq!(
            repo.update_tag(&cancel, tid, &update).await,
            Err(RepositoryError::TagNameTooLong { actual: 33, max: 32 })
        );

        db.cache().clear();
        let tag = repo.select_tag_by_id(&cancel, tid).await.unwrap().unwrap();
        assert_eq!(tag.name, "rust");
        assert_eq!(tag.category, TagCategory::Language);
    }

    #[tokio::test]
    async fn test_questions_by_tag_and_delete() {
        let db = TestDb::new().await.unwrap();
        let repo = db.tag_repository();
        let cancel = CancellationToken::new();
        let uid = db.seed_user("asker").await.unwrap();
        let rust = db.seed_tag("rust").await.unwrap();
        let unused = db.seed_tag("cobol").await.unwrap();
        let q1 = db.seed_question(uid, "1", &[rust]).await.unwrap();
        let q2 = db.seed_question(uid, "2", &[rust]).await.unwrap();

        assert_eq!(
            repo.select_questions_id_by_tag(&cancel, rust).await.unwrap(),
            Some(vec![q1, q2])
        );
        assert_eq!(
            repo.select_questions_id_by_tag(&cancel, unused).await.unwrap(),
            Some(vec![])
        );

        assert_ok!(repo.delete_tag_by_id(&cancel, rust).await);
        assert_ok!(repo.delete_tag_by_id(&cancel, rust).await);
        assert_eq!(
            repo.select_questions_id_by_tag(&cancel, rust).await.unwrap(),
            None
        );
        let tags = db
            .question_repository()
            .select_tags_for_question_by_id(&cancel, q1)
            .await
            .unwrap();
        assert_eq!(tags, Some(vec![]));
    }
}
