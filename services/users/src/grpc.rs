//! gRPC server adapter
//!
//! Exposes a [`UserService`] as `users.UsersService`. Wire input is validated
//! here before the domain service is called; domain errors are turned into
//! status codes on the way out.

use std::{future::Future, sync::Arc};

use common::{ContextError, RequestContext, User};
use proto::{
    DeleteRequest, DeleteResponse, GetUserByIdRequest, GetUserByIdResponse, GetUsersRequest,
    GetUsersResponse, InsertRequest, InsertResponse, UpdateRequest, UpdateResponse,
    users_service_server::{UsersService, UsersServiceServer},
};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status, transport::Server};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::service::{ServiceError, UserService};

/// `users.UsersService` implementation backed by a domain service
pub struct UsersGrpcServer<S> {
    service: Arc<S>,
}

impl<S> UsersGrpcServer<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }
}

/// Rebuild the caller's context from the `grpc-timeout` header
fn request_context<T>(request: &Request<T>) -> RequestContext {
    let timeout = request
        .metadata()
        .get("grpc-timeout")
        .and_then(|value| value.to_str().ok());
    RequestContext::from_grpc_timeout(timeout)
}

fn context_status(op: &'static str, err: ContextError) -> Status {
    warn!("{}: request context is done: {}", op, err);
    match err {
        ContextError::DeadlineExceeded => Status::deadline_exceeded("request timed out"),
        ContextError::Cancelled => Status::cancelled("request cancelled"),
    }
}

fn service_status(op: &'static str, err: ServiceError) -> Status {
    match err {
        ServiceError::NotFound { .. } => {
            warn!("{}: {}", op, err);
            Status::not_found("user doesn't exist")
        }
        ServiceError::AlreadyExists { .. } => {
            warn!("{}: {}", op, err);
            Status::already_exists("user already exists")
        }
        ServiceError::Cancelled { source, .. } => context_status(op, source),
        ServiceError::Internal { .. } => {
            error!("{}: {}", op, err);
            Status::internal("internal error")
        }
    }
}

/// Validate and parse a required identifier field
fn required_id(op: &'static str, id: &str) -> Result<Uuid, Status> {
    if id.is_empty() {
        warn!("{}: id is required", op);
        return Err(Status::invalid_argument("id is required"));
    }

    proto::parse_user_id(id).map_err(|e| {
        warn!("{}: {}", op, e);
        Status::invalid_argument("wrong id, must be uuid")
    })
}

/// Validate a required user payload
fn required_user(op: &'static str, user: Option<proto::User>) -> Result<proto::User, Status> {
    user.ok_or_else(|| {
        warn!("{}: user is required", op);
        Status::invalid_argument("user is required")
    })
}

#[tonic::async_trait]
impl<S: UserService + 'static> UsersService for UsersGrpcServer<S> {
    async fn get_users(
        &self,
        request: Request<GetUsersRequest>,
    ) -> Result<Response<GetUsersResponse>, Status> {
        const OP: &str = "grpc.user.get_users";
        let ctx = request_context(&request);
        ctx.check().map_err(|e| context_status(OP, e))?;

        let users = self
            .service
            .get_users(&ctx)
            .await
            .map_err(|e| service_status(OP, e))?;

        Ok(Response::new(GetUsersResponse {
            users: users.into_iter().map(proto::User::from).collect(),
        }))
    }

    async fn get_user_by_id(
        &self,
        request: Request<GetUserByIdRequest>,
    ) -> Result<Response<GetUserByIdResponse>, Status> {
        const OP: &str = "grpc.user.get_user_by_id";
        let ctx = request_context(&request);
        ctx.check().map_err(|e| context_status(OP, e))?;

        let id = required_id(OP, &request.get_ref().id)?;

        let user = self
            .service
            .get_user_by_id(&ctx, id)
            .await
            .map_err(|e| service_status(OP, e))?;

        Ok(Response::new(GetUserByIdResponse {
            user: Some(user.into()),
        }))
    }

    async fn insert_user(
        &self,
        request: Request<InsertRequest>,
    ) -> Result<Response<InsertResponse>, Status> {
        const OP: &str = "grpc.user.insert_user";
        let ctx = request_context(&request);
        ctx.check().map_err(|e| context_status(OP, e))?;

        let wire = required_user(OP, request.into_inner().user)?;
        let user = User::try_from(wire).map_err(|e| {
            warn!("{}: {}", OP, e);
            Status::invalid_argument("wrong id, must be uuid")
        })?;

        let user = self
            .service
            .insert_user(&ctx, user)
            .await
            .map_err(|e| service_status(OP, e))?;

        Ok(Response::new(InsertResponse {
            user: Some(user.into()),
        }))
    }

    async fn update_user(
        &self,
        request: Request<UpdateRequest>,
    ) -> Result<Response<UpdateResponse>, Status> {
        const OP: &str = "grpc.user.update_user";
        let ctx = request_context(&request);
        ctx.check().map_err(|e| context_status(OP, e))?;

        let UpdateRequest { id, user } = request.into_inner();
        let id = required_id(OP, &id)?;
        let wire = required_user(OP, user)?;

        // The path identifier wins; the payload's own id is not consulted
        let user = User::new(id, wire.login, wire.password);

        let user = self
            .service
            .update_user(&ctx, id, user)
            .await
            .map_err(|e| service_status(OP, e))?;

        Ok(Response::new(UpdateResponse {
            user: Some(user.into()),
        }))
    }

    async fn delete_user(
        &self,
        request: Request<DeleteRequest>,
    ) -> Result<Response<DeleteResponse>, Status> {
        const OP: &str = "grpc.user.delete_user";
        let ctx = request_context(&request);
        ctx.check().map_err(|e| context_status(OP, e))?;

        let id = required_id(OP, &request.get_ref().id)?;

        let user = self
            .service
            .delete_user(&ctx, id)
            .await
            .map_err(|e| service_status(OP, e))?;

        Ok(Response::new(DeleteResponse {
            user: Some(user.into()),
        }))
    }
}

/// Serve `users.UsersService` on `listener` until `shutdown` resolves
///
/// In-flight calls are allowed to finish once shutdown has been requested.
pub async fn serve<S, F>(
    listener: TcpListener,
    service: Arc<S>,
    shutdown: F,
) -> Result<(), tonic::transport::Error>
where
    S: UserService + 'static,
    F: Future<Output = ()> + Send,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Starting gRPC server on {}", addr);
    }

    Server::builder()
        .add_service(UsersServiceServer::new(UsersGrpcServer::new(service)))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await?;

    info!("gRPC server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MockUserService;
    use std::time::Duration;
    use tonic::Code;

    fn server(service: MockUserService) -> UsersGrpcServer<MockUserService> {
        UsersGrpcServer::new(Arc::new(service))
    }

    fn wire_user(id: &str) -> proto::User {
        proto::User {
            id: id.to_string(),
            login: "alice".to_string(),
            password: "x".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_id_is_invalid_argument() {
        let server = server(MockUserService::new());

        let status = server
            .get_user_by_id(Request::new(GetUserByIdRequest { id: String::new() }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = server
            .delete_user(Request::new(DeleteRequest { id: String::new() }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_malformed_id_is_invalid_argument() {
        let server = server(MockUserService::new());

        let status = server
            .get_user_by_id(Request::new(GetUserByIdRequest {
                id: "not-a-uuid".to_string(),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "wrong id, must be uuid");
    }

    #[tokio::test]
    async fn test_missing_user_is_invalid_argument() {
        let server = server(MockUserService::new());

        let status = server
            .insert_user(Request::new(InsertRequest { user: None }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = server
            .update_user(Request::new(UpdateRequest {
                id: Uuid::new_v4().to_string(),
                user: None,
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_insert_with_malformed_user_id_is_invalid_argument() {
        let server = server(MockUserService::new());

        let status = server
            .insert_user(Request::new(InsertRequest {
                user: Some(wire_user("garbage")),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_domain_errors_map_to_status_codes() {
        let mut service = MockUserService::new();
        service
            .expect_get_user_by_id()
            .returning(|_, _| Err(ServiceError::NotFound { op: "service" }));
        service
            .expect_insert_user()
            .returning(|_, _| Err(ServiceError::AlreadyExists { op: "service" }));
        service.expect_delete_user().returning(|_, _| {
            Err(ServiceError::Cancelled {
                op: "service",
                source: ContextError::DeadlineExceeded,
            })
        });
        service.expect_get_users().returning(|_| {
            Err(ServiceError::Internal {
                op: "service",
                source: crate::storage::StorageError::Internal {
                    op: "storage",
                    source: sqlx::Error::PoolTimedOut,
                },
            })
        });
        let server = server(service);
        let id = Uuid::new_v4().to_string();

        let status = server
            .get_user_by_id(Request::new(GetUserByIdRequest { id: id.clone() }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);

        let status = server
            .insert_user(Request::new(InsertRequest {
                user: Some(wire_user(&id)),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::AlreadyExists);

        let status = server
            .delete_user(Request::new(DeleteRequest { id }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::DeadlineExceeded);

        let status = server
            .get_users(Request::new(GetUsersRequest {}))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::Internal);
        assert!(!status.message().contains("pool"));
    }

    #[tokio::test]
    async fn test_expired_grpc_timeout_short_circuits() {
        // No expectations: reaching the domain service panics
        let server = server(MockUserService::new());

        let mut request = Request::new(GetUsersRequest {});
        request
            .metadata_mut()
            .insert("grpc-timeout", "0n".parse().unwrap());

        let status = server.get_users(request).await.unwrap_err();
        assert_eq!(status.code(), Code::DeadlineExceeded);
    }

    #[tokio::test]
    async fn test_client_deadline_reaches_service_context() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut service = MockUserService::new();
        service.expect_get_users().times(1).returning(move |ctx| {
            tx.send(ctx.remaining()).unwrap();
            Ok(Vec::new())
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(
            listener,
            Arc::new(service),
            std::future::pending::<()>(),
        ));

        let mut client = proto::users_service_client::UsersServiceClient::connect(format!(
            "http://{}",
            addr
        ))
        .await
        .unwrap();
        let mut request = Request::new(GetUsersRequest {});
        request.set_timeout(Duration::from_secs(7));
        client.get_users(request).await.unwrap();

        let remaining = rx
            .recv_timeout(Duration::from_secs(1))
            .unwrap()
            .expect("server context should carry a deadline");
        assert!(remaining <= Duration::from_secs(7));
        assert!(remaining > Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_update_uses_request_id() {
        let id = Uuid::new_v4();
        let mut service = MockUserService::new();
        service
            .expect_update_user()
            .withf(move |_, target, user| *target == id && user.id == id)
            .times(1)
            .returning(|_, _, user| Ok(user));
        let server = server(service);

        let response = server
            .update_user(Request::new(UpdateRequest {
                id: id.to_string(),
                user: Some(wire_user("")),
            }))
            .await
            .unwrap()
            .into_inner();

        let user = response.user.unwrap();
        assert_eq!(user.id, id.to_string());
        assert_eq!(user.login, "alice");
    }

    #[tokio::test]
    async fn test_get_users_encodes_every_user() {
        let users = vec![
            User::new(Uuid::new_v4(), "alice", "x"),
            User::new(Uuid::new_v4(), "bob", "y"),
        ];
        let expected = users.clone();
        let mut service = MockUserService::new();
        service
            .expect_get_users()
            .times(1)
            .returning(move |_| Ok(users.clone()));
        let server = server(service);

        let response = server
            .get_users(Request::new(GetUsersRequest {}))
            .await
            .unwrap()
            .into_inner();

        let decoded: Vec<User> = response
            .users
            .into_iter()
            .map(|u| User::try_from(u).unwrap())
            .collect();
        assert_eq!(decoded, expected);
    }
}
