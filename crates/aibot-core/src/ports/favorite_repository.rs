//! Favorite folder repository trait definition.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::RepositoryError;
use crate::domain::{FavoriteInfo, NewFavorite};

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    async fn select_favorite_by_id(
        &self,
        cancel: &CancellationToken,
        fid: i64,
    ) -> Result<Option<FavoriteInfo>, RepositoryError>;

    /// Create a folder for an existing user and return its id.
    async fn insert_favorite(
        &self,
        cancel: &CancellationToken,
        favorite: &NewFavorite,
    ) -> Result<i64, RepositoryError>;

    /// Rename a folder.
    async fn update_favorite(
        &self,
        cancel: &CancellationToken,
        fid: i64,
        name: &str,
    ) -> Result<(), RepositoryError>;

    /// Delete a folder and everything collected in it. Silent when missing.
    async fn delete_favorite_by_id(
        &self,
        cancel: &CancellationToken,
        fid: i64,
    ) -> Result<(), RepositoryError>;
}
