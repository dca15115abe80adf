//! Tag repository trait definition.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::RepositoryError;
use crate::domain::{NewTag, TagInfo, TagUpdate};

/// Repository for tags. A name is unique within its category.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// All tags ordered by id.
    async fn select_all_tags(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<TagInfo>, RepositoryError>;

    async fn select_tag_by_id(
        &self,
        cancel: &CancellationToken,
        tid: i64,
    ) -> Result<Option<TagInfo>, RepositoryError>;

    /// Questions carrying the tag, `None` when the tag does not exist.
    async fn select_questions_id_by_tag(
        &self,
        cancel: &CancellationToken,
        tid: i64,
    ) -> Result<Option<Vec<i64>>, RepositoryError>;

    async fn insert_tag(
        &self,
        cancel: &CancellationToken,
        tag: &NewTag,
    ) -> Result<i64, RepositoryError>;

    async fn update_tag(
        &self,
        cancel: &CancellationToken,
        tid: i64,
        update: &TagUpdate,
    ) -> Result<(), RepositoryError>;

    /// Silent when missing. Detaches the tag from every question.
    async fn delete_tag_by_id(
        &self,
        cancel: &CancellationToken,
        tid: i64,
    ) -> Result<(), RepositoryError>;
}
