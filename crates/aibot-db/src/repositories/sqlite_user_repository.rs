//! `SQLite` implementation of the `UserRepository` trait.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use aibot_core::utils::validation::{check_user_bcrypt, check_user_email, check_user_name};
use aibot_core::{
    AnswerIdInfo, CacheKey, CachePool, CacheRegion, ListOrder, NewUser, RepositoryError, User,
    UserRepository, UserUpdate,
};

use super::base::{ChangeSet, Entity, RepositoryBase, SqlValue, guarded};
use super::row_mappers::{USER_SELECT_COLUMNS, UserRow};

/// `SQLite` implementation of the `UserRepository` trait.
pub struct SqliteUserRepository {
    base: RepositoryBase,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool, cache: Arc<dyn CachePool>) -> Self {
        Self {
            base: RepositoryBase::new(pool, cache),
        }
    }

    async fn select_one(
        &self,
        cancel: &CancellationToken,
        column: &str,
        value: SqlValue,
    ) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_SELECT_COLUMNS} FROM users WHERE {column} = ?");
        let query = sqlx::query_as::<_, UserRow>(&sql);
        let query = match &value {
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.as_str()),
            _ => return Err(RepositoryError::Storage("unsupported user key".to_string())),
        };
        let row = guarded(cancel, query.fetch_optional(self.base.pool())).await?;

        let user = row.map(User::try_from).transpose()?;
        if let Some(user) = &user {
            self.base
                .cache()
                .put(CacheKey::new(CacheRegion::User, user.user_id), user.clone());
        }
        Ok(user)
    }

    async fn email_taken(
        &self,
        cancel: &CancellationToken,
        email: &str,
    ) -> Result<bool, RepositoryError> {
        let found: i64 = guarded(
            cancel,
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
                .bind(email)
                .fetch_one(self.base.pool()),
        )
        .await?;
        Ok(found != 0)
    }

    /// Whether a user other than `except` already has `name`.
    async fn name_taken(
        &self,
        cancel: &CancellationToken,
        name: &str,
        except: Option<i64>,
    ) -> Result<bool, RepositoryError> {
        let found: i64 = guarded(
            cancel,
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE name = ? AND user_id IS NOT ?)",
            )
            .bind(name)
            .bind(except)
            .fetch_one(self.base.pool()),
        )
        .await?;
        Ok(found != 0)
    }

    /// Email collisions win over name collisions.
    async fn check_unique(
        &self,
        cancel: &CancellationToken,
        email: &str,
        name: &str,
    ) -> Result<(), RepositoryError> {
        if self.email_taken(cancel, email).await? {
            return Err(RepositoryError::EmailHasExist(email.to_string()));
        }
        if self.name_taken(cancel, name, None).await? {
            return Err(RepositoryError::NameHasExist(name.to_string()));
        }
        Ok(())
    }
}

fn order_clause(order: ListOrder, key: &str) -> String {
    match order {
        ListOrder::Unspecified => String::new(),
        ListOrder::ModifyTimeDesc => format!(" ORDER BY modify_time DESC, {key} DESC"),
        ListOrder::CreateTimeAsc => format!(" ORDER BY create_time, {key}"),
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn select_user_by_id(
        &self,
        cancel: &CancellationToken,
        uid: i64,
    ) -> Result<Option<User>, RepositoryError> {
        let key = CacheKey::new(CacheRegion::User, uid);
        if let Some(user) = self.base.cached::<User>(cancel, &key)? {
            return Ok(Some(user));
        }
        self.select_one(cancel, "user_id", uid.into()).await
    }

    async fn select_user_by_email(
        &self,
        cancel: &CancellationToken,
        email: &str,
    ) -> Result<Option<User>, RepositoryError> {
        self.select_one(cancel, "email", email.into()).await
    }

    async fn select_user_by_name(
        &self,
        cancel: &CancellationToken,
        name: &str,
    ) -> Result<Option<User>, RepositoryError> {
        self.select_one(cancel, "name", name.into()).await
    }

    async fn select_bcrypt_by_email(
        &self,
        cancel: &CancellationToken,
        email: &str,
    ) -> Result<Option<String>, RepositoryError> {
        guarded(
            cancel,
            sqlx::query_scalar("SELECT bcrypt FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(self.base.pool()),
        )
        .await
    }

    async fn select_answers_id_by_id(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        order: ListOrder,
    ) -> Result<Option<Vec<AnswerIdInfo>>, RepositoryError> {
        let sql = format!(
            "SELECT answer_id, question_id FROM answers WHERE user_id = ?{}",
            order_clause(order, "answer_id")
        );
        let rows: Vec<(i64, i64)> = guarded(
            cancel,
            sqlx::query_as(&sql).bind(uid).fetch_all(self.base.pool()),
        )
        .await?;
        let answers = rows
            .into_iter()
            .map(|(answer_id, question_id)| AnswerIdInfo {
                answer_id,
                question_id,
            })
            .collect();
        self.base
            .non_empty_or_parent(cancel, answers, Entity::User(uid))
            .await
    }

    async fn select_questions_id_by_id(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        order: ListOrder,
    ) -> Result<Option<Vec<i64>>, RepositoryError> {
        let sql = format!(
            "SELECT question_id FROM questions WHERE user_id = ?{}",
            order_clause(order, "question_id")
        );
        let rows: Vec<i64> = guarded(
            cancel,
            sqlx::query_scalar(&sql).bind(uid).fetch_all(self.base.pool()),
        )
        .await?;
        self.base
            .non_empty_or_parent(cancel, rows, Entity::User(uid))
            .await
    }

    async fn select_favorites_id_by_id(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        order: ListOrder,
    ) -> Result<Option<Vec<i64>>, RepositoryError> {
        let order = match order {
            ListOrder::Unspecified => "",
            ListOrder::CreateTimeAsc => " ORDER BY create_time, favorite_id",
            ListOrder::ModifyTimeDesc => " ORDER BY create_time DESC, favorite_id DESC",
        };
        let sql = format!("SELECT favorite_id FROM favorites WHERE user_id = ?{order}");
        let rows: Vec<i64> = guarded(
            cancel,
            sqlx::query_scalar(&sql).bind(uid).fetch_all(self.base.pool()),
        )
        .await?;
        self.base
            .non_empty_or_parent(cancel, rows, Entity::User(uid))
            .await
    }

    async fn insert_user(
        &self,
        cancel: &CancellationToken,
        user: &NewUser,
    ) -> Result<i64, RepositoryError> {
        let email = user
            .email
            .as_deref()
            .ok_or(RepositoryError::InvalidParameter("email"))?;
        let bcrypt = user
            .bcrypt
            .as_deref()
            .ok_or(RepositoryError::InvalidParameter("bcrypt"))?;
        let name = user
            .name
            .as_deref()
            .ok_or(RepositoryError::InvalidParameter("name"))?;
        let profile_photo = user
            .profile_photo
            .ok_or(RepositoryError::InvalidParameter("profile_photo"))?;
        if !user.auth.is_concrete() {
            return Err(RepositoryError::InvalidParameter("auth"));
        }

        check_user_email(email)?;
        check_user_name(name)?;
        check_user_bcrypt(bcrypt)?;

        let mut changes = ChangeSet::new();
        changes.insert(
            "INSERT INTO users (email, bcrypt, name, auth, profile_photo) VALUES (?, ?, ?, ?, ?)",
            vec![
                email.into(),
                bcrypt.into(),
                name.into(),
                user.auth.as_i64().into(),
                profile_photo.into(),
            ],
        );

        loop {
            self.check_unique(cancel, email, name).await?;
            match self.base.try_save_once(cancel, &changes).await? {
                Ok(receipt) => return receipt.require_inserted_id(),
                Err(conflict) => {
                    tracing::debug!(?conflict, email, name, "insert_user conflicted, rechecking");
                }
            }
        }
    }

    async fn update_user(
        &self,
        cancel: &CancellationToken,
        uid: i64,
        update: &UserUpdate,
    ) -> Result<(), RepositoryError> {
        // A missing user wins over a malformed update.
        self.base.require(cancel, Entity::User(uid)).await?;
        if let Some(bcrypt) = &update.bcrypt {
            check_user_bcrypt(bcrypt)?;
        }
        if let Some(name) = &update.name {
            check_user_name(name)?;
        }
        if update.auth.is_some_and(|auth| !auth.is_concrete()) {
            return Err(RepositoryError::InvalidParameter("auth"));
        }
        if update.is_empty() {
            return Ok(());
        }

        let mut sets = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();
        if let Some(bcrypt) = &update.bcrypt {
            sets.push("bcrypt = ?");
            values.push(bcrypt.as_str().into());
        }
        if let Some(name) = &update.name {
            sets.push("name = ?");
            values.push(name.as_str().into());
        }
        if let Some(auth) = update.auth {
            sets.push("auth = ?");
            values.push(auth.as_i64().into());
        }
        if let Some(photo) = update.profile_photo {
            sets.push("profile_photo = ?");
            values.push(photo.into());
        }
        values.push(uid.into());

        let mut changes = ChangeSet::new();
        changes.execute_expecting(
            format!("UPDATE users SET {} WHERE user_id = ?", sets.join(", ")),
            values,
            1,
        );

        let key = CacheKey::new(CacheRegion::User, uid);
        loop {
            if let Some(name) = &update.name {
                if self.name_taken(cancel, name, Some(uid)).await? {
                    return Err(RepositoryError::NameHasExist(name.clone()));
                }
            }
            self.base.require(cancel, Entity::User(uid)).await?;
            match self.base.try_save_once(cancel, &changes).await? {
                Ok(_) => {
                    self.base.cache().invalidate(&key);
                    return Ok(());
                }
                Err(conflict) => {
                    tracing::debug!(?conflict, uid, "update_user conflicted, rechecking");
                }
            }
        }
    }

    async fn delete_user_by_id(
        &self,
        cancel: &CancellationToken,
        uid: i64,
    ) -> Result<(), RepositoryError> {
        let mut changes = ChangeSet::new();
        changes.execute("DELETE FROM users WHERE user_id = ?", vec![uid.into()]);
        let receipt = self.base.save(cancel, &changes).await?;

        // Cascades reach favorites, questions and answers of the user.
        if receipt.rows_affected > 0 {
            self.base.cache().clear();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use aibot_core::{AuthLevel, QuestionRepository};
    use tokio_test::assert_ok;

    use super::*;
    use crate::factory::TestDb;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser::new(email, TestDb::bcrypt(), name, AuthLevel::User, 7)
    }

    #[tokio::test]
    async fn test_insert_then_select() {
        let db = TestDb::new().await.unwrap();
        let repo = db.user_repository();
        let cancel = CancellationToken::new();

        let uid = repo
            .insert_user(&cancel, &new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        let user = repo.select_user_by_id(&cancel, uid).await.unwrap().unwrap();
        assert_eq!(user.name, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.auth, AuthLevel::User);
        assert_eq!(user.profile_photo, 7);

        let by_email = repo
            .select_user_by_email(&cancel, "alice@example.com")
            .await
            .unwrap();
        assert_eq!(by_email, Some(user.clone()));
        let by_name = repo.select_user_by_name(&cancel, "alice").await.unwrap();
        assert_eq!(by_name, Some(user));
        assert_eq!(repo.select_user_by_id(&cancel, uid + 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_email_or_name() {
        let db = TestDb::new().await.unwrap();
        let repo = db.user_repository();
        let cancel = CancellationToken::new();
        assert_ok!(repo.insert_user(&cancel, &new_user("alice", "a@x.io")).await);

        let err = repo
            .insert_user(&cancel, &new_user("bob", "a@x.io"))
            .await
            .unwrap_err();
        assert_eq!(err, RepositoryError::EmailHasExist("a@x.io".to_string()));

        let err = repo
            .insert_user(&cancel, &new_user("alice", "b@x.io"))
            .await
            .unwrap_err();
        assert_eq!(err, RepositoryError::NameHasExist("alice".to_string()));

        // Both collide: email wins.
        let err = repo
            .insert_user(&cancel, &new_user("alice", "a@x.io"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::EmailHasExist(_)));
    }

    #[tokio::test]
    async fn test_insert_requires_every_field() {
        let db = TestDb::new().await.unwrap();
        let repo = db.user_repository();
        let cancel = CancellationToken::new();

        let mut user = new_user("carol", "c@x.io");
        user.profile_photo = None;
        assert_eq!(
            repo.insert_user(&cancel, &user).await,
            Err(RepositoryError::InvalidParameter("profile_photo"))
        );

        let mut user = new_user("carol", "c@x.io");
        user.auth = AuthLevel::None;
        assert_eq!(
            repo.insert_user(&cancel, &user).await,
            Err(RepositoryError::InvalidParameter("auth"))
        );
    }

    #[tokio::test]
    async fn test_insert_length_limits() {
        let db = TestDb::new().await.unwrap();
        let repo = db.user_repository();
        let cancel = CancellationToken::new();

        let long_name = "n".repeat(33);
        let err = repo
            .insert_user(&cancel, &new_user(&long_name, "n@x.io"))
            .await
            .unwrap_err();
        assert_eq!(err, RepositoryError::UserNameTooLong { actual: 33, max: 32 });

        let mut user = new_user("dave", "d@x.io");
        user.bcrypt = Some("short".to_string());
        let err = repo.insert_user(&cancel, &user).await.unwrap_err();
        assert_eq!(
            err,
            RepositoryError::UserBcryptLength {
                actual: 5,
                required: 60
            }
        );

        // Nothing was written.
        assert_eq!(repo.select_user_by_name(&cancel, "dave").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_bcrypt_by_email() {
        let db = TestDb::new().await.unwrap();
        let repo = db.user_repository();
        let cancel = CancellationToken::new();
        db.seed_user("erin").await.unwrap();

        let hash = repo
            .select_bcrypt_by_email(&cancel, "erin@example.com")
            .await
            .unwrap();
        assert_eq!(hash, Some(TestDb::bcrypt()));
        let missing = repo
            .select_bcrypt_by_email(&cancel, "nobody@example.com")
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_lists_distinguish_missing_user_from_empty() {
        let db = TestDb::new().await.unwrap();
        let repo = db.user_repository();
        let cancel = CancellationToken::new();
        let uid = db.seed_user("frank").await.unwrap();

        assert_eq!(
            repo.select_questions_id_by_id(&cancel, uid, ListOrder::Unspecified)
                .await
                .unwrap(),
            Some(vec![])
        );
        assert_eq!(
            repo.select_questions_id_by_id(&cancel, uid + 100, ListOrder::Unspecified)
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            repo.select_answers_id_by_id(&cancel, uid + 100, ListOrder::ModifyTimeDesc)
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            repo.select_favorites_id_by_id(&cancel, uid, ListOrder::CreateTimeAsc)
                .await
                .unwrap(),
            Some(vec![])
        );
    }

    #[tokio::test]
    async fn test_lists_order() {
        let db = TestDb::new().await.unwrap();
        let repo = db.user_repository();
        let cancel = CancellationToken::new();
        let uid = db.seed_user("gina").await.unwrap();
        let other = db.seed_user("hank").await.unwrap();

        let q1 = db.seed_question(uid, "first", &[]).await.unwrap();
        let q2 = db.seed_question(uid, "second", &[]).await.unwrap();
        let a1 = db.seed_answer(uid, q1).await.unwrap();
        let a2 = db.seed_answer(uid, q2).await.unwrap();
        db.seed_answer(other, q2).await.unwrap();

        // Answering bumps the question, so q2 was modified last.
        let questions = repo
            .select_questions_id_by_id(&cancel, uid, ListOrder::ModifyTimeDesc)
            .await
            .unwrap();
        assert_eq!(questions, Some(vec![q2, q1]));

        let answers = repo
            .select_answers_id_by_id(&cancel, uid, ListOrder::ModifyTimeDesc)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            answers,
            vec![
                AnswerIdInfo {
                    answer_id: a2,
                    question_id: q2
                },
                AnswerIdInfo {
                    answer_id: a1,
                    question_id: q1
                },
            ]
        );

        let f1 = db.seed_favorite(uid, "later").await.unwrap();
        let f2 = db.seed_favorite(uid, "reading").await.unwrap();
        let favorites = repo
            .select_favorites_id_by_id(&cancel, uid, ListOrder::CreateTimeAsc)
            .await
            .unwrap();
        assert_eq!(favorites, Some(vec![f1, f2]));
    }

    #[tokio::test]
    async fn test_update_fields() {
        let db = TestDb::new().await.unwrap();
        let repo = db.user_repository();
        let cancel = CancellationToken::new();
        let uid = db.seed_user("ivan").await.unwrap();

        // Prime the cache, then make sure the update is visible.
        repo.select_user_by_id(&cancel, uid).await.unwrap();
        let update = UserUpdate {
            name: Some("ivan2".to_string()),
            auth: Some(AuthLevel::Admin),
            ..UserUpdate::default()
        };
        repo.update_user(&cancel, uid, &update).await.unwrap();

        let user = repo.select_user_by_id(&cancel, uid).await.unwrap().unwrap();
        assert_eq!(user.name, "ivan2");
        assert_eq!(user.auth, AuthLevel::Admin);
        assert_eq!(user.email, "ivan@example.com");
    }

    #[tokio::test]
    async fn test_empty_update_is_noop() {
        let db = TestDb::new().await.unwrap();
        let repo = db.user_repository();
        let cancel = CancellationToken::new();
        let uid = db.seed_user("judy").await.unwrap();
        let before = repo.select_user_by_id(&cancel, uid).await.unwrap();

        assert_ok!(repo.update_user(&cancel, uid, &UserUpdate::default()).await);
        db.cache().clear();
        assert_eq!(repo.select_user_by_id(&cancel, uid).await.unwrap(), before);

        assert_eq!(
            repo.update_user(&cancel, uid + 1, &UserUpdate::default()).await,
            Err(RepositoryError::UserNotExist(uid + 1))
        );
    }

    #[tokio::test]
    async fn test_update_rejects_taken_name_and_missing_user() {
        let db = TestDb::new().await.unwrap();
        let repo = db.user_repository();
        let cancel = CancellationToken::new();
        let uid = db.seed_user("kate").await.unwrap();
        db.seed_user("liam").await.unwrap();

        let rename = UserUpdate {
            name: Some("liam".to_string()),
            ..UserUpdate::default()
        };
        assert_eq!(
            repo.update_user(&cancel, uid, &rename).await,
            Err(RepositoryError::NameHasExist("liam".to_string()))
        );

        // Renaming to one's own name is fine.
        let same = UserUpdate {
            name: Some("kate".to_string()),
            ..UserUpdate::default()
        };
        assert_ok!(repo.update_user(&cancel, uid, &same).await);

        let photo = UserUpdate {
            profile_photo: Some(1),
            ..UserUpdate::default()
        };
        assert_eq!(
            repo.update_user(&cancel, 999, &photo).await,
            Err(RepositoryError::UserNotExist(999))
        );

    }

    #[tokio::test]
    async fn test_update_length_limits_leave_row_unchanged() {
        let db = TestDb::new().await.unwrap();
        let repo = db.user_repository();
        let cancel = CancellationToken::new();
        let uid = db.seed_user("pat").await.unwrap();

        let long_name = UserUpdate {
            name: Some("p".repeat(40)),
            ..UserUpdate::default()
        };
        assert_eq!(
            repo.update_user(&cancel, uid, &long_name).await,
            Err(RepositoryError::UserNameTooLong { actual: 40, max: 32 })
        );

        // Counted in characters, not bytes.
        let wide_name = UserUpdate {
            name: Some("é".repeat(32)),
            ..UserUpdate::default()
        };
        assert_ok!(repo.update_user(&cancel, uid, &wide_name).await);
        let rename_back = UserUpdate {
            name: Some("pat".to_string()),
            ..UserUpdate::default()
        };
        assert_ok!(repo.update_user(&cancel, uid, &rename_back).await);

        let bad_hash = UserUpdate {
            bcrypt: Some("x".repeat(61)),
            name: Some("patricia".to_string()),
            ..UserUpdate::default()
        };
        assert_eq!(
            repo.update_user(&cancel, uid, &bad_hash).await,
            Err(RepositoryError::UserBcryptLength {
                actual: 61,
                required: 60
            })
        );

        db.cache().clear();
        let user = repo.select_user_by_id(&cancel, uid).await.unwrap().unwrap();
        assert_eq!(user.name, "pat");
        assert_eq!(
            repo.select_bcrypt_by_email(&cancel, "pat@example.com")
                .await
                .unwrap(),
            Some(TestDb::bcrypt())
        );
    }

    #[tokio::test]
    async fn test_update_missing_user_reported_before_lengths() {
        let db = TestDb::new().await.unwrap();
        let repo = db.user_repository();
        let cancel = CancellationToken::new();

        let long_name = UserUpdate {
            name: Some("q".repeat(40)),
            ..UserUpdate::default()
        };
        assert_eq!(
            repo.update_user(&cancel, 9999, &long_name).await,
            Err(RepositoryError::UserNotExist(9999))
        );
    }

    #[tokio::test]
    async fn test_insert_email_too_long() {
        let db = TestDb::new().await.unwrap();
        let repo = db.user_repository();
        let cancel = CancellationToken::new();

        let email = format!("{}@x.io", "e".repeat(250));
        let err = repo
            .insert_user(&cancel, &new_user("eve", &email))
            .await
            .unwrap_err();
        assert_eq!(err, RepositoryError::UserEmailTooLong { actual: 255, max: 254 });
        assert_eq!(repo.select_user_by_name(&cancel, "eve").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = TestDb::new().await.unwrap();
        let repo = db.user_repository();
        let cancel = CancellationToken::new();
        let uid = db.seed_user("mia").await.unwrap();
        let qid = db.seed_question(uid, "orphaned", &[]).await.unwrap();
        repo.select_user_by_id(&cancel, uid).await.unwrap();

        assert_ok!(repo.delete_user_by_id(&cancel, uid).await);
        assert_eq!(repo.select_user_by_id(&cancel, uid).await.unwrap(), None);

        // Missing user: silent.
        assert_ok!(repo.delete_user_by_id(&cancel, uid).await);

        // Questions outlive their owner.
        let question = db
            .question_repository()
            .select_question_by_id(&cancel, qid)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(question.user_id, None);
    }

    #[tokio::test]
    async fn test_cancelled_before_call() {
        let db = TestDb::new().await.unwrap();
        let repo = db.user_repository();
        let cancel = CancellationToken::new();
        let uid = db.seed_user("noah").await.unwrap();
        repo.select_user_by_id(&cancel, uid).await.unwrap();
        cancel.cancel();

        // Cached reads observe the token too.
        assert_eq!(
            repo.select_user_by_id(&cancel, uid).await,
            Err(RepositoryError::Cancelled)
        );
        assert_eq!(
            repo.insert_user(&cancel, &new_user("olga", "o@x.io")).await,
            Err(RepositoryError::Cancelled)
        );
        assert_eq!(
            repo.delete_user_by_id(&cancel, uid).await,
            Err(RepositoryError::Cancelled)
        );
    }
}
