//! Existence-marker associations shared by likes and collects.
//!
//! A row in one of the join tables means "on"; its absence means "off".
//! Turning a marker on twice, or off when it is already off, is an error.

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use aibot_core::RepositoryError;

use super::base::{ChangeSet, Entity, RepositoryBase, guarded};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    /// A user likes a target.
    Like,
    /// A favorite folder collects a target.
    Collect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Question,
    Answer,
}

impl TargetKind {
    const fn column(self) -> &'static str {
        match self {
            Self::Question => "question_id",
            Self::Answer => "answer_id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Question(i64),
    Answer(i64),
}

impl Target {
    const fn id(self) -> i64 {
        match self {
            Self::Question(id) | Self::Answer(id) => id,
        }
    }

    const fn kind(self) -> TargetKind {
        match self {
            Self::Question(_) => TargetKind::Question,
            Self::Answer(_) => TargetKind::Answer,
        }
    }

    const fn entity(self) -> Entity {
        match self {
            Self::Question(id) => Entity::Question(id),
            Self::Answer(id) => Entity::Answer(id),
        }
    }
}

impl AssociationKind {
    const fn table(self, target: TargetKind) -> &'static str {
        match (self, target) {
            (Self::Like, TargetKind::Question) => "like_questions",
            (Self::Like, TargetKind::Answer) => "like_answers",
            (Self::Collect, TargetKind::Question) => "collect_questions",
            (Self::Collect, TargetKind::Answer) => "collect_answers",
        }
    }

    const fn owner_column(self) -> &'static str {
        match self {
            Self::Like => "user_id",
            Self::Collect => "favorite_id",
        }
    }

    const fn owner_entity(self, owner: i64) -> Entity {
        match self {
            Self::Like => Entity::User(owner),
            Self::Collect => Entity::Favorite(owner),
        }
    }
}

/// One `(owner, target)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Association {
    pub kind: AssociationKind,
    pub owner: i64,
    pub target: Target,
}

impl Association {
    pub const fn like(uid: i64, target: Target) -> Self {
        Self {
            kind: AssociationKind::Like,
            owner: uid,
            target,
        }
    }

    pub const fn collect(fid: i64, target: Target) -> Self {
        Self {
            kind: AssociationKind::Collect,
            owner: fid,
            target,
        }
    }

    const fn table(self) -> &'static str {
        self.kind.table(self.target.kind())
    }

    const fn owner_column(self) -> &'static str {
        self.kind.owner_column()
    }

    const fn owner_entity(self) -> Entity {
        self.kind.owner_entity(self.owner)
    }

    const fn target_column(self) -> &'static str {
        self.target.kind().column()
    }

    const fn already_on(self) -> RepositoryError {
        let (owner, target) = (self.owner, self.target.id());
        match self.kind {
            AssociationKind::Like => RepositoryError::UserHasLikedTarget { uid: owner, target },
            AssociationKind::Collect => {
                RepositoryError::FavoriteHasCollectedTarget { fid: owner, target }
            }
        }
    }

    const fn already_off(self) -> RepositoryError {
        let (owner, target) = (self.owner, self.target.id());
        match self.kind {
            AssociationKind::Like => RepositoryError::UserNotLikedTarget { uid: owner, target },
            AssociationKind::Collect => {
                RepositoryError::FavoriteNotCollectedTarget { fid: owner, target }
            }
        }
    }
}

/// Like/collect operations over a [`RepositoryBase`].
#[derive(Clone)]
pub struct ToggleStore {
    base: RepositoryBase,
}

impl ToggleStore {
    pub const fn new(base: RepositoryBase) -> Self {
        Self { base }
    }

    pub const fn base(&self) -> &RepositoryBase {
        &self.base
    }

    /// Check the owner, then the target.
    async fn require_refs(
        &self,
        cancel: &CancellationToken,
        assoc: Association,
    ) -> Result<(), RepositoryError> {
        self.base.require(cancel, assoc.owner_entity()).await?;
        self.base.require(cancel, assoc.target.entity()).await
    }

    async fn is_on_unchecked(
        &self,
        cancel: &CancellationToken,
        assoc: Association,
    ) -> Result<bool, RepositoryError> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ? AND {} = ?)",
            assoc.table(),
            assoc.owner_column(),
            assoc.target_column(),
        );
        let found: i64 = guarded(
            cancel,
            sqlx::query_scalar(&sql)
                .bind(assoc.owner)
                .bind(assoc.target.id())
                .fetch_one(self.base.pool()),
        )
        .await?;
        Ok(found != 0)
    }

    /// Membership test. Fails when the owner or target is missing.
    pub async fn is_on(
        &self,
        cancel: &CancellationToken,
        assoc: Association,
    ) -> Result<bool, RepositoryError> {
        self.require_refs(cancel, assoc).await?;
        self.is_on_unchecked(cancel, assoc).await
    }

    pub async fn turn_on(
        &self,
        cancel: &CancellationToken,
        assoc: Association,
    ) -> Result<(), RepositoryError> {
        let mut changes = ChangeSet::new();
        changes.execute(
            format!(
                "INSERT INTO {} ({}, {}, create_time) VALUES (?, ?, ?)",
                assoc.table(),
                assoc.owner_column(),
                assoc.target_column(),
            ),
            vec![
                assoc.owner.into(),
                assoc.target.id().into(),
                Utc::now().into(),
            ],
        );

        loop {
            self.require_refs(cancel, assoc).await?;
            if self.is_on_unchecked(cancel, assoc).await? {
                return Err(assoc.already_on());
            }
            match self.base.try_save_once(cancel, &changes).await? {
                Ok(_) => return Ok(()),
                Err(conflict) => {
                    tracing::debug!(?assoc, ?conflict, "association insert conflicted, rechecking");
                }
            }
        }
    }

    pub async fn turn_off(
        &self,
        cancel: &CancellationToken,
        assoc: Association,
    ) -> Result<(), RepositoryError> {
        let mut changes = ChangeSet::new();
        changes.execute_expecting(
            format!(
                "DELETE FROM {} WHERE {} = ? AND {} = ?",
                assoc.table(),
                assoc.owner_column(),
                assoc.target_column(),
            ),
            vec![assoc.owner.into(), assoc.target.id().into()],
            1,
        );

        loop {
            self.require_refs(cancel, assoc).await?;
            if !self.is_on_unchecked(cancel, assoc).await? {
                return Err(assoc.already_off());
            }
            match self.base.try_save_once(cancel, &changes).await? {
                Ok(_) => return Ok(()),
                Err(conflict) => {
                    tracing::debug!(?assoc, ?conflict, "association delete conflicted, rechecking");
                }
            }
        }
    }

    /// Markers on a target, optionally only those created at or after `since`.
    /// Fails when the target is missing.
    pub async fn count_for_target(
        &self,
        cancel: &CancellationToken,
        kind: AssociationKind,
        target: Target,
        since: Option<DateTime<Utc>>,
    ) -> Result<i64, RepositoryError> {
        self.base.require(cancel, target.entity()).await?;

        let mut sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?",
            kind.table(target.kind()),
            target.kind().column()
        );
        if since.is_some() {
            sql.push_str(" AND create_time >= ?");
        }

        let mut query = sqlx::query_scalar(&sql).bind(target.id());
        if let Some(since) = since {
            query = query.bind(since);
        }
        guarded(cancel, query.fetch_one(self.base.pool())).await
    }

    /// Target ids marked by an owner, oldest marker first.
    ///
    /// `None` when the owner does not exist.
    pub async fn targets_of_owner(
        &self,
        cancel: &CancellationToken,
        kind: AssociationKind,
        owner: i64,
        target: TargetKind,
    ) -> Result<Option<Vec<i64>>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ? ORDER BY create_time, rowid",
            target.column(),
            kind.table(target),
            kind.owner_column(),
        );
        let rows: Vec<i64> = guarded(
            cancel,
            sqlx::query_scalar(&sql)
                .bind(owner)
                .fetch_all(self.base.pool()),
        )
        .await?;
        self.base
            .non_empty_or_parent(cancel, rows, kind.owner_entity(owner))
            .await
    }
}
