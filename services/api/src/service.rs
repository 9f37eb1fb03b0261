//! Domain service of the API
//!
//! Same shape as the users service's domain layer, sitting on top of the
//! remote [`UserStorage`] instead of a database.

use async_trait::async_trait;
use common::{ContextError, RequestContext, User};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::storage::{StorageError, UserStorage};

/// Errors raised by the API domain service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{op}: user not found")]
    NotFound { op: &'static str },

    #[error("{op}: user already exists")]
    AlreadyExists { op: &'static str },

    #[error("{op}: {source}")]
    Cancelled {
        op: &'static str,
        #[source]
        source: ContextError,
    },

    #[error("{op}: {source}")]
    Internal {
        op: &'static str,
        #[source]
        source: StorageError,
    },
}

impl ServiceError {
    fn from_storage(op: &'static str, err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => {
                warn!("{}: {}", op, err);
                Self::NotFound { op }
            }
            StorageError::AlreadyExists { .. } => {
                warn!("{}: {}", op, err);
                Self::AlreadyExists { op }
            }
            StorageError::Cancelled { source, .. } => Self::Cancelled { op, source },
            err @ StorageError::Internal { .. } => {
                error!("{}: {}", op, err);
                Self::Internal { op, source: err }
            }
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// User operations exposed to the HTTP handlers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_users(&self, ctx: &RequestContext) -> ServiceResult<Vec<User>>;

    async fn get_user_by_id(&self, ctx: &RequestContext, id: Uuid) -> ServiceResult<User>;

    async fn insert_user(&self, ctx: &RequestContext, user: User) -> ServiceResult<User>;

    async fn update_user(&self, ctx: &RequestContext, id: Uuid, user: User)
    -> ServiceResult<User>;

    async fn delete_user(&self, ctx: &RequestContext, id: Uuid) -> ServiceResult<User>;
}

/// [`UserService`] on top of a [`UserStorage`]
pub struct UserServiceImpl<S> {
    storage: S,
}

impl<S: UserStorage> UserServiceImpl<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

fn enter(op: &'static str, ctx: &RequestContext) -> ServiceResult<()> {
    ctx.check().map_err(|source| {
        warn!("{}: request context is done: {}", op, source);
        ServiceError::Cancelled { op, source }
    })
}

#[async_trait]
impl<S: UserStorage> UserService for UserServiceImpl<S> {
    async fn get_users(&self, ctx: &RequestContext) -> ServiceResult<Vec<User>> {
        const OP: &str = "api.user.get_users";
        enter(OP, ctx)?;

        self.storage
            .get_users(ctx)
            .await
            .map_err(|e| ServiceError::from_storage(OP, e))
    }

    async fn get_user_by_id(&self, ctx: &RequestContext, id: Uuid) -> ServiceResult<User> {
        const OP: &str = "api.user.get_user_by_id";
        enter(OP, ctx)?;

        self.storage
            .get_user_by_id(ctx, id)
            .await
            .map_err(|e| ServiceError::from_storage(OP, e))
    }

    async fn insert_user(&self, ctx: &RequestContext, user: User) -> ServiceResult<User> {
        const OP: &str = "api.user.insert_user";
        enter(OP, ctx)?;

        self.storage
            .insert_user(ctx, user)
            .await
            .map_err(|e| ServiceError::from_storage(OP, e))
    }

    async fn update_user(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        user: User,
    ) -> ServiceResult<User> {
        const OP: &str = "api.user.update_user";
        enter(OP, ctx)?;

        self.storage
            .update_user(ctx, id, user)
            .await
            .map_err(|e| ServiceError::from_storage(OP, e))
    }

    async fn delete_user(&self, ctx: &RequestContext, id: Uuid) -> ServiceResult<User> {
        const OP: &str = "api.user.delete_user";
        enter(OP, ctx)?;

        self.storage
            .delete_user(ctx, id)
            .await
            .map_err(|e| ServiceError::from_storage(OP, e))
    }
}
