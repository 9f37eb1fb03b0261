//! Remote storage adapter over the users gRPC service
//!
//! The adapter follows a connect-per-call policy: every operation dials the
//! users service, performs one call and drops the channel. Nothing is shared
//! between requests except the target endpoint.

use async_trait::async_trait;
use common::{RequestContext, User};
use proto::{
    DeleteRequest, GetUserByIdRequest, GetUsersRequest, InsertRequest, UpdateRequest,
    users_service_client::UsersServiceClient,
};
use tonic::{Request, transport::Channel};
use tracing::debug;
use uuid::Uuid;

use super::{ClientFailure, StorageError, StorageResult, UserStorage};

/// [`UserStorage`] that forwards to a remote `users.UsersService`
#[derive(Debug, Clone)]
pub struct GrpcUserStorage {
    endpoint: String,
}

impl GrpcUserStorage {
    /// Create an adapter targeting `endpoint`, e.g. `http://127.0.0.1:50051`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn connect(
        &self,
        op: &'static str,
        ctx: &RequestContext,
    ) -> StorageResult<UsersServiceClient<Channel>> {
        ctx.check().map_err(|e| StorageError::cancelled(op, e))?;

        debug!("{}: connecting to {}", op, self.endpoint);
        ctx.run(UsersServiceClient::connect(self.endpoint.clone()))
            .await
            .map_err(|e| StorageError::cancelled(op, e))?
            .map_err(|e| StorageError::internal(op, e))
    }
}

/// Wrap `message`, carrying the context's remaining time as `grpc-timeout`
fn request<T>(ctx: &RequestContext, message: T) -> Request<T> {
    let mut request = Request::new(message);
    if let Some(remaining) = ctx.remaining() {
        request.set_timeout(remaining);
    }
    request
}

/// Decode the single user a successful response must carry
fn decode_user(op: &'static str, user: Option<proto::User>) -> StorageResult<User> {
    let user = user.ok_or_else(|| StorageError::internal(op, ClientFailure::MissingUser))?;
    User::try_from(user).map_err(|e| StorageError::internal(op, e))
}

#[async_trait]
impl UserStorage for GrpcUserStorage {
    async fn get_users(&self, ctx: &RequestContext) -> StorageResult<Vec<User>> {
        const OP: &str = "client.user.get_users";
        let mut client = self.connect(OP, ctx).await?;

        let response = ctx
            .run(client.get_users(request(ctx, GetUsersRequest {})))
            .await
            .map_err(|e| StorageError::cancelled(OP, e))?
            .map_err(|s| StorageError::from_status(OP, s))?
            .into_inner();

        response
            .users
            .into_iter()
            .map(|user| User::try_from(user).map_err(|e| StorageError::internal(OP, e)))
            .collect()
    }

    async fn get_user_by_id(&self, ctx: &RequestContext, id: Uuid) -> StorageResult<User> {
        const OP: &str = "client.user.get_user_by_id";
        let mut client = self.connect(OP, ctx).await?;

        let message = GetUserByIdRequest { id: id.to_string() };
        let response = ctx
            .run(client.get_user_by_id(request(ctx, message)))
            .await
            .map_err(|e| StorageError::cancelled(OP, e))?
            .map_err(|s| StorageError::from_status(OP, s))?
            .into_inner();

        decode_user(OP, response.user)
    }

    async fn insert_user(&self, ctx: &RequestContext, user: User) -> StorageResult<User> {
        const OP: &str = "client.user.insert_user";
        let mut client = self.connect(OP, ctx).await?;

        let message = InsertRequest {
            user: Some(user.into()),
        };
        let response = ctx
            .run(client.insert_user(request(ctx, message)))
            .await
            .map_err(|e| StorageError::cancelled(OP, e))?
            .map_err(|s| StorageError::from_status(OP, s))?
            .into_inner();

        decode_user(OP, response.user)
    }

    async fn update_user(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        user: User,
    ) -> StorageResult<User> {
        const OP: &str = "client.user.update_user";
        let mut client = self.connect(OP, ctx).await?;

        let message = UpdateRequest {
            id: id.to_string(),
            user: Some(user.into()),
        };
        let response = ctx
            .run(client.update_user(request(ctx, message)))
            .await
            .map_err(|e| StorageError::cancelled(OP, e))?
            .map_err(|s| StorageError::from_status(OP, s))?
            .into_inner();

        decode_user(OP, response.user)
    }

    async fn delete_user(&self, ctx: &RequestContext, id: Uuid) -> StorageResult<User> {
        const OP: &str = "client.user.delete_user";
        let mut client = self.connect(OP, ctx).await?;

        let message = DeleteRequest { id: id.to_string() };
        let response = ctx
            .run(client.delete_user(request(ctx, message)))
            .await
            .map_err(|e| StorageError::cancelled(OP, e))?
            .map_err(|s| StorageError::from_status(OP, s))?
            .into_inner();

        decode_user(OP, response.user)
    }
}
