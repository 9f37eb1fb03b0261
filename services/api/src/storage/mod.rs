//! Storage port of the API service
//!
//! On this side of the pipeline users are stored remotely: the only adapter
//! is [`grpc::GrpcUserStorage`], which forwards every call to the users
//! service. Its failures are reported in the same storage-shaped vocabulary
//! the users service uses for its database, so the API domain service reads
//! like its counterpart.

use async_trait::async_trait;
use common::{ContextError, RequestContext, User};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

pub mod grpc;

/// Why a remote call failed without a classified status
#[derive(Error, Debug)]
pub enum ClientFailure {
    /// The users service could not be reached
    #[error("transport: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// The users service answered with an unclassified status
    #[error("status {}: {}", .0.code(), .0.message())]
    Status(tonic::Status),

    /// A successful response did not carry the expected user
    #[error("response carried no user")]
    MissingUser,

    /// A user in the response could not be decoded
    #[error("decode: {0}")]
    Decode(#[from] proto::InvalidUserId),
}

/// Errors raised by the remote storage adapter
#[derive(Error, Debug)]
pub enum StorageError {
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
        source: ClientFailure,
    },
}

impl StorageError {
    pub(crate) fn cancelled(op: &'static str, source: ContextError) -> Self {
        warn!("{}: request context is done: {}", op, source);
        Self::Cancelled { op, source }
    }

    pub(crate) fn internal(op: &'static str, source: impl Into<ClientFailure>) -> Self {
        let source = source.into();
        error!("{}: remote call failed: {}", op, source);
        Self::Internal { op, source }
    }

    /// Classify a status returned by the users service
    ///
    /// Only `NotFound`, `AlreadyExists` and the deadline codes keep their
    /// class; any other code is `Internal`.
    pub(crate) fn from_status(op: &'static str, status: tonic::Status) -> Self {
        match status.code() {
            tonic::Code::NotFound => Self::NotFound { op },
            tonic::Code::AlreadyExists => Self::AlreadyExists { op },
            tonic::Code::DeadlineExceeded => Self::cancelled(op, ContextError::DeadlineExceeded),
            tonic::Code::Cancelled => Self::cancelled(op, ContextError::Cancelled),
            _ => Self::internal(op, ClientFailure::Status(status)),
        }
    }
}

/// Type alias for storage results
pub type StorageResult<T> = Result<T, StorageError>;

/// Port for user persistence as seen from the API service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStorage: Send + Sync {
    async fn get_users(&self, ctx: &RequestContext) -> StorageResult<Vec<User>>;

    async fn get_user_by_id(&self, ctx: &RequestContext, id: Uuid) -> StorageResult<User>;

    async fn insert_user(&self, ctx: &RequestContext, user: User) -> StorageResult<User>;

    async fn update_user(&self, ctx: &RequestContext, id: Uuid, user: User)
    -> StorageResult<User>;

    async fn delete_user(&self, ctx: &RequestContext, id: Uuid) -> StorageResult<User>;
}
