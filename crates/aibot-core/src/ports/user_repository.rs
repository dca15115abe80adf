//! User repository trait definition.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::RepositoryError;
use crate::domain::{AnswerIdInfo, ListOrder, NewUser, User, UserUpdate};

/// Repository for user accounts.
///
/// List reads return `Ok(None)` when the user does not exist and
/// `Ok(Some(vec![]))` when the user exists but owns nothing.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn select_user_by_id(
        &self,
        cancel: &CancellationToken,
        uid: i64,
    ) -> Result<Option<User>, RepositoryError>;

    async fn select_user_by_email(
        &self,
        cancel: &CancellationToken,
        email: &str,
    ) -> Result<Option<User>, RepositoryError>;

    async fn select_user_by_name(
        &self,
        cancel: &CancellationToken,
        name: &str,
    ) -> Result<Option<User>, RepositoryError>;

    /// Password hash for the given email, `None` when no such user exists.
    async fn select_bcrypt_by_email(
        &self,
        cancel: &CancellationToken,
        email: &str,
    ) -> Result<Option<String>, RepositoryError>;

    /// Answers written by the user, with the question each one belongs to.
    ///
    /// `ListOrder::ModifyTimeDesc` orders by the answer's modify time.
    async fn select_answers_id_by_id(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        order: ListOrder,
    ) -> Result<Option<Vec<AnswerIdInfo>>, RepositoryError>;

    /// Questions owned by the user.
    async fn select_questions_id_by_id(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        order: ListOrder,
    ) -> Result<Option<Vec<i64>>, RepositoryError>;

    /// Favorite folders owned by the user.
    ///
    /// `ListOrder::CreateTimeAsc` lists the oldest folder first.
    async fn select_favorites_id_by_id(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        order: ListOrder,
    ) -> Result<Option<Vec<i64>>, RepositoryError>;

    /// Insert a user and return its id.
    ///
    /// Validation order: required fields, auth level, email length, name
    /// length, bcrypt length, then email and name uniqueness. An email
    /// collision is reported before a name collision.
    async fn insert_user(
        &self,
        cancel: &CancellationToken,
        user: &NewUser,
    ) -> Result<i64, RepositoryError>;

    /// Apply a partial update. An empty update only checks existence.
    async fn update_user(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        update: &UserUpdate,
    ) -> Result<(), RepositoryError>;

    /// Delete a user. Deleting a missing user succeeds silently.
    async fn delete_user_by_id(
        &self,
        cancel: &CancellationToken,
        uid: i64,
    ) -> Result<(), RepositoryError>;
}
