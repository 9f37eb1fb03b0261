//! Storage port of the users service
//!
//! [`UserStorage`] is implemented by [`postgres::PgUserStorage`] in
//! production. Every failure is reported as a [`StorageError`], whose variant
//! is the classification and whose `op` names the operation that failed.

use std::sync::Arc;

use async_trait::async_trait;
use common::{ContextError, RequestContext, User};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod postgres;

/// Errors raised by storage adapters
#[derive(Error, Debug)]
pub enum StorageError {
    /// The referenced user does not exist
    #[error("{op}: user not found")]
    NotFound { op: &'static str },

    /// A uniqueness constraint rejected the write
    #[error("{op}: user already exists")]
    AlreadyExists { op: &'static str },

    /// The request context expired before or during the operation
    #[error("{op}: {source}")]
    Cancelled {
        op: &'static str,
        #[source]
        source: ContextError,
    },

    /// Any other driver failure
    #[error("{op}: {source}")]
    Internal {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl StorageError {
    pub(crate) fn cancelled(op: &'static str, source: ContextError) -> Self {
        warn!("{}: request context is done: {}", op, source);
        Self::Cancelled { op, source }
    }

    /// Classify a driver error
    ///
    /// "No rows" becomes `NotFound`, a unique-constraint violation becomes
    /// `AlreadyExists` and everything else is `Internal`.
    pub(crate) fn from_sqlx(op: &'static str, err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound { op },
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                warn!("{}: unique constraint violated: {}", op, db);
                Self::AlreadyExists { op }
            }
            err => {
                error!("{}: query failed: {}", op, err);
                Self::Internal { op, source: err }
            }
        }
    }
}

/// Type alias for storage results
pub type StorageResult<T> = Result<T, StorageError>;

/// Port for user persistence
///
/// Implementations check the context before touching the store and fail
/// with [`StorageError::Cancelled`] when it is already done.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Every stored user; an empty store yields an empty list
    async fn get_users(&self, ctx: &RequestContext) -> StorageResult<Vec<User>>;

    /// The user with identifier `id`
    async fn get_user_by_id(&self, ctx: &RequestContext, id: Uuid) -> StorageResult<User>;

    /// Store a new user under its caller-supplied identifier
    async fn insert_user(&self, ctx: &RequestContext, user: User) -> StorageResult<User>;

    /// Replace login and password of user `id`; the identifier never changes
    async fn update_user(&self, ctx: &RequestContext, id: Uuid, user: User)
    -> StorageResult<User>;

    /// Remove user `id`, returning the snapshot taken before deletion
    async fn delete_user(&self, ctx: &RequestContext, id: Uuid) -> StorageResult<User>;
}

#[async_trait]
impl<S: UserStorage + ?Sized> UserStorage for Arc<S> {
    async fn get_users(&self, ctx: &RequestContext) -> StorageResult<Vec<User>> {
        (**self).get_users(ctx).await
    }

    async fn get_user_by_id(&self, ctx: &RequestContext, id: Uuid) -> StorageResult<User> {
        (**self).get_user_by_id(ctx, id).await
    }

    async fn insert_user(&self, ctx: &RequestContext, user: User) -> StorageResult<User> {
        (**self).insert_user(ctx, user).await
    }

    async fn update_user(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        user: User,
    ) -> StorageResult<User> {
        (**self).update_user(ctx, id, user).await
    }

    async fn delete_user(&self, ctx: &RequestContext, id: Uuid) -> StorageResult<User> {
        (**self).delete_user(ctx, id).await
    }
}
