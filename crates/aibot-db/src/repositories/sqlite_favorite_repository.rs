//! `SQLite` implementation of the `FavoriteRepository` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use aibot_core::utils::validation::check_favorite_name;
use aibot_core::{
    CacheKey, CachePool, CacheRegion, FavoriteInfo, FavoriteRepository, NewFavorite,
    RepositoryError,
};

use super::base::{ChangeSet, Entity, RepositoryBase, guarded};
use super::row_mappers::{FAVORITE_SELECT_COLUMNS, FavoriteRow};

/// `SQLite` implementation of the `FavoriteRepository` trait.
pub struct SqliteFavoriteRepository {
    base: RepositoryBase,
}

impl SqliteFavoriteRepository {
    pub fn new(pool: SqlitePool, cache: Arc<dyn CachePool>) -> Self {
        Self {
            base: RepositoryBase::new(pool, cache),
        }
    }
}

#[async_trait]
impl FavoriteRepository for SqliteFavoriteRepository {
    async fn select_favorite_by_id(
        &self,
        cancel: &CancellationToken,
        fid: i64,
    ) -> Result<Option<FavoriteInfo>, RepositoryError> {
        let key = CacheKey::new(CacheRegion::Favorite, fid);
        if let Some(favorite) = self.base.cached::<FavoriteInfo>(cancel, &key)? {
            return Ok(Some(favorite));
        }

        let sql = format!("SELECT {FAVORITE_SELECT_COLUMNS} FROM favorites WHERE favorite_id = ?");
        let row: Option<FavoriteRow> = guarded(
            cancel,
            sqlx::query_as(&sql).bind(fid).fetch_optional(self.base.pool()),
        )
        .await?;

        let favorite = row.map(FavoriteInfo::from);
        if let Some(favorite) = &favorite {
            self.base.cache().put(key, favorite.clone());
        }
        Ok(favorite)
    }

    async fn insert_favorite(
        &self,
        cancel: &CancellationToken,
        favorite: &NewFavorite,
    ) -> Result<i64, RepositoryError> {
        check_favorite_name(&favorite.name)?;

        let mut changes = ChangeSet::new();
        changes.insert(
            "INSERT INTO favorites (user_id, name, create_time) VALUES (?, ?, ?)",
            vec![
                favorite.user_id.into(),
                favorite.name.as_str().into(),
                Utc::now().into(),
            ],
        );

        loop {
            self.base
                .require(cancel, Entity::User(favorite.user_id))
                .await?;
            match self.base.try_save_once(cancel, &changes).await? {
                Ok(receipt) => return receipt.require_inserted_id(),
                Err(conflict) => {
                    tracing::debug!(
                        ?conflict,
                        uid = favorite.user_id,
                        "insert_favorite conflicted, rechecking"
                    );
                }
            }
        }
    }

    async fn update_favorite(
        &self,
        cancel: &CancellationToken,
        fid: i64,
        name: &str,
    ) -> Result<(), RepositoryError> {
        check_favorite_name(name)?;

        let mut changes = ChangeSet::new();
        changes.execute_expecting(
            "UPDATE favorites SET name = ? WHERE favorite_id = ?",
            vec![name.into(), fid.into()],
            1,
        );

        loop {
            self.base.require(cancel, Entity::Favorite(fid)).await?;
            match self.base.try_save_once(cancel, &changes).await? {
                Ok(_) => {
                    self.base
                        .cache()
                        .invalidate(&CacheKey::new(CacheRegion::Favorite, fid));
                    return Ok(());
                }
                Err(conflict) => {
                    tracing::debug!(?conflict, fid, "update_favorite conflicted, rechecking");
                }
            }
        }
    }

    async fn delete_favorite_by_id(
        &self,
        cancel: &CancellationToken,
        fid: i64,
    ) -> Result<(), RepositoryError> {
        let mut changes = ChangeSet::new();
        changes.execute("DELETE FROM favorites WHERE favorite_id = ?", vec![fid.into()]);
        self.base.save(cancel, &changes).await?;
        self.base
            .cache()
            .invalidate(&CacheKey::new(CacheRegion::Favorite, fid));
        Ok(())
    }
}
