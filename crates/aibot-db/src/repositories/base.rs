//! Shared plumbing for every `SQLite` repository.
//!
//! A mutation is described up front as a [`ChangeSet`] and committed with
//! [`RepositoryBase::try_save_once`], which reports a write conflict as a
//! value instead of an error. Callers loop: re-run their precondition checks
//! (which may fail with a terminal domain error) and try again.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Sqlite, SqlitePool};
use tokio_util::sync::CancellationToken;

use aibot_core::{CacheKey, CachePool, RepositoryError};

// ─────────────────────────────────────────────────────────────────────────────
// Cancellation
// ─────────────────────────────────────────────────────────────────────────────

/// Await `fut` unless `cancel` fires first.
///
/// Fails with `Cancelled` when the token is already cancelled, fires while
/// waiting, or is found cancelled once the future completes.
pub async fn race<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, RepositoryError> {
    if cancel.is_cancelled() {
        return Err(RepositoryError::Cancelled);
    }
    let output = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(RepositoryError::Cancelled),
        output = fut => output,
    };
    if cancel.is_cancelled() {
        return Err(RepositoryError::Cancelled);
    }
    Ok(output)
}

/// [`race`] for a storage call, mapping driver errors to `Storage`.
pub async fn guarded<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    race(cancel, fut).await?.map_err(map_sqlx_error)
}

pub fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Change sets
// ─────────────────────────────────────────────────────────────────────────────

/// A value bound to a statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Text(String),
    Time(DateTime<Utc>),
    Null,
    /// Row id produced by the change set's insert statement.
    InsertedId,
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Time(v)
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[derive(Debug, Clone)]
struct Statement {
    sql: Cow<'static, str>,
    values: Vec<SqlValue>,
    expected_rows: Option<u64>,
}

/// Pending mutation: statements run in order inside one transaction.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    statements: Vec<Statement>,
    insert_index: Option<usize>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the statement whose row id is reported in the receipt and
    /// substituted for [`SqlValue::InsertedId`] in later statements.
    pub fn insert(
        &mut self,
        sql: impl Into<Cow<'static, str>>,
        values: Vec<SqlValue>,
    ) -> &mut Self {
        self.insert_index = Some(self.statements.len());
        self.push(sql.into(), values, None)
    }

    pub fn execute(
        &mut self,
        sql: impl Into<Cow<'static, str>>,
        values: Vec<SqlValue>,
    ) -> &mut Self {
        self.push(sql.into(), values, None)
    }

    /// Add a statement that must touch exactly `rows` rows. Any other count
    /// means the row changed underneath us and is reported as
    /// [`ConflictKind::RowVanished`].
    pub fn execute_expecting(
        &mut self,
        sql: impl Into<Cow<'static, str>>,
        values: Vec<SqlValue>,
        rows: u64,
    ) -> &mut Self {
        self.push(sql.into(), values, Some(rows))
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    fn push(
        &mut self,
        sql: Cow<'static, str>,
        values: Vec<SqlValue>,
        expected_rows: Option<u64>,
    ) -> &mut Self {
        self.statements.push(Statement {
            sql,
            values,
            expected_rows,
        });
        self
    }
}

/// Why a single commit attempt was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    UniqueViolation,
    ForeignKeyViolation,
    /// The database was locked by another writer.
    Busy,
    /// A statement touched a different number of rows than expected.
    RowVanished,
}

/// Outcome of a committed change set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReceipt {
    pub inserted_id: Option<i64>,
    pub rows_affected: u64,
}

impl SaveReceipt {
    pub fn require_inserted_id(self) -> Result<i64, RepositoryError> {
        self.inserted_id
            .ok_or_else(|| RepositoryError::Storage("change set inserted no row".to_string()))
    }
}

fn classify(e: &sqlx::Error) -> Option<ConflictKind> {
    let sqlx::Error::Database(db) = e else {
        return None;
    };
    match db.kind() {
        ErrorKind::UniqueViolation => Some(ConflictKind::UniqueViolation),
        ErrorKind::ForeignKeyViolation => Some(ConflictKind::ForeignKeyViolation),
        _ => match db.code().as_deref() {
            // SQLITE_BUSY, SQLITE_LOCKED and their extended codes
            Some("5" | "6" | "261" | "262" | "517") => Some(ConflictKind::Busy),
            _ => None,
        },
    }
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &'q SqlValue,
    inserted_id: Option<i64>,
) -> Result<Query<'q, Sqlite, SqliteArguments<'q>>, RepositoryError> {
    Ok(match value {
        SqlValue::Int(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.as_str()),
        SqlValue::Time(v) => query.bind(*v),
        SqlValue::Null => query.bind(None::<i64>),
        SqlValue::InsertedId => query.bind(inserted_id.ok_or_else(|| {
            RepositoryError::Storage("inserted id referenced before insert".to_string())
        })?),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Entities
// ─────────────────────────────────────────────────────────────────────────────

/// A row addressed by primary key, used for existence checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User(i64),
    Question(i64),
    Answer(i64),
    Tag(i64),
    Favorite(i64),
}

impl Entity {
    const fn table_and_key(self) -> (&'static str, &'static str, i64) {
        match self {
            Self::User(id) => ("users", "user_id", id),
            Self::Question(id) => ("questions", "question_id", id),
            Self::Answer(id) => ("answers", "answer_id", id),
            Self::Tag(id) => ("tags", "tag_id", id),
            Self::Favorite(id) => ("favorites", "favorite_id", id),
        }
    }

    pub const fn not_found(self) -> RepositoryError {
        match self {
            Self::User(id) => RepositoryError::UserNotExist(id),
            Self::Question(id) => RepositoryError::QuestionNotExist(id),
            Self::Answer(id) => RepositoryError::AnswerNotExist(id),
            Self::Tag(id) => RepositoryError::TagNotExist(id),
            Self::Favorite(id) => RepositoryError::FavoriteNotExist(id),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Base
// ─────────────────────────────────────────────────────────────────────────────

/// Pool and cache shared by a repository.
#[derive(Clone)]
pub struct RepositoryBase {
    pool: SqlitePool,
    cache: Arc<dyn CachePool>,
}

impl RepositoryBase {
    pub fn new(pool: SqlitePool, cache: Arc<dyn CachePool>) -> Self {
        Self { pool, cache }
    }

    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn cache(&self) -> &(dyn CachePool + 'static) {
        self.cache.as_ref()
    }

    /// Cache lookup that still honours cancellation.
    pub fn cached<T: Clone + 'static>(
        &self,
        cancel: &CancellationToken,
        key: &CacheKey,
    ) -> Result<Option<T>, RepositoryError> {
        if cancel.is_cancelled() {
            return Err(RepositoryError::Cancelled);
        }
        Ok(self.cache.get_as::<T>(key))
    }

    pub async fn exists(
        &self,
        cancel: &CancellationToken,
        entity: Entity,
    ) -> Result<bool, RepositoryError> {
        let (table, key, id) = entity.table_and_key();
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE {key} = ?)");
        let found: i64 = guarded(
            cancel,
            sqlx::query_scalar(&sql).bind(id).fetch_one(&self.pool),
        )
        .await?;
        Ok(found != 0)
    }

    /// Fail with the entity's `*NotExist` error when it is missing.
    pub async fn require(
        &self,
        cancel: &CancellationToken,
        entity: Entity,
    ) -> Result<(), RepositoryError> {
        if self.exists(cancel, entity).await? {
            Ok(())
        } else {
            Err(entity.not_found())
        }
    }

    /// Resolve an empty child list: `None` when the parent is missing,
    /// `Some(vec![])` when it merely has no children.
    pub async fn non_empty_or_parent<T: Send>(
        &self,
        cancel: &CancellationToken,
        rows: Vec<T>,
        parent: Entity,
    ) -> Result<Option<Vec<T>>, RepositoryError> {
        if !rows.is_empty() || self.exists(cancel, parent).await? {
            Ok(Some(rows))
        } else {
            Ok(None)
        }
    }

    /// Run `changes` in one transaction.
    ///
    /// Returns `Ok(Err(kind))` after rolling back when the attempt hit a
    /// write conflict. Every other failure is an error.
    pub async fn try_save_once(
        &self,
        cancel: &CancellationToken,
        changes: &ChangeSet,
    ) -> Result<Result<SaveReceipt, ConflictKind>, RepositoryError> {
        let mut tx = guarded(cancel, self.pool.begin()).await?;
        let mut inserted_id = None;
        let mut rows_affected = 0;

        for (index, statement) in changes.statements.iter().enumerate() {
            let mut query = sqlx::query(statement.sql.as_ref());
            for value in &statement.values {
                query = bind_value(query, value, inserted_id)?;
            }

            let result = match race(cancel, query.execute(&mut *tx)).await? {
                Ok(result) => result,
                Err(e) => {
                    return match classify(&e) {
                        Some(kind) => {
                            tracing::debug!(?kind, error = %e, "write conflict, rolling back");
                            guarded(cancel, tx.rollback()).await?;
                            Ok(Err(kind))
                        }
                        None => Err(map_sqlx_error(e)),
                    };
                }
            };

            if let Some(expected) = statement.expected_rows {
                if result.rows_affected() != expected {
                    tracing::debug!(
                        expected,
                        actual = result.rows_affected(),
                        "row count mismatch, rolling back"
                    );
                    guarded(cancel, tx.rollback()).await?;
                    return Ok(Err(ConflictKind::RowVanished));
                }
            }
            if changes.insert_index == Some(index) {
                inserted_id = Some(result.last_insert_rowid());
            }
            rows_affected += result.rows_affected();
        }

        match race(cancel, tx.commit()).await? {
            Ok(()) => Ok(Ok(SaveReceipt {
                inserted_id,
                rows_affected,
            })),
            Err(e) => match classify(&e) {
                Some(kind) => {
                    tracing::debug!(?kind, error = %e, "commit conflict");
                    Ok(Err(kind))
                }
                None => Err(map_sqlx_error(e)),
            },
        }
    }

    /// Commit `changes`, retrying on conflict without re-checking anything.
    ///
    /// Only for change sets whose outcome cannot depend on other writers,
    /// such as idempotent deletes.
    pub async fn save(
        &self,
        cancel: &CancellationToken,
        changes: &ChangeSet,
    ) -> Result<SaveReceipt, RepositoryError> {
        loop {
            match self.try_save_once(cancel, changes).await? {
                Ok(receipt) => return Ok(receipt),
                Err(kind) => tracing::debug!(?kind, "retrying save"),
            }
        }
    }
}
