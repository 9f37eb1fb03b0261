//! End-to-end tests of the user pipeline
//!
//! Each test runs the whole chain in-process: axum router, gRPC client,
//! a real tonic server on an ephemeral port, the users domain service and
//! in-memory storage.

use std::{sync::Arc, time::Duration};

use api::{
    routes::create_router, service::UserServiceImpl, state::AppState,
    storage::grpc::GrpcUserStorage,
};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use common::User;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;
use users::storage::memory::InMemoryUserStorage;
use uuid::Uuid;

struct Pipeline {
    app: Router,
    storage: Arc<InMemoryUserStorage>,
}

async fn pipeline(request_timeout: Duration) -> Pipeline {
    let storage = Arc::new(InMemoryUserStorage::new());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let users_service = Arc::new(users::service::UserServiceImpl::new(storage.clone()));
    tokio::spawn(users::grpc::serve(
        listener,
        users_service,
        std::future::pending::<()>(),
    ));

    let client = GrpcUserStorage::new(format!("http://{}", addr));
    let service = UserServiceImpl::new(client);
    let app = create_router(AppState::new(Arc::new(service), request_timeout));

    Pipeline { app, storage }
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_user_lifecycle_over_http() {
    let Pipeline { app, .. } = pipeline(Duration::from_secs(5)).await;
    let id = Uuid::new_v4();
    let body = json!({"id": id, "login": "alice", "password": "x"});
    let uri = format!("/api/v1/users/{}", id);

    let (status, created) = send(&app, Method::POST, "/api/v1/users", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(serde_json::from_slice::<Value>(&created).unwrap(), body);

    let (status, _) = send(&app, Method::POST, "/api/v1/users", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&fetched).unwrap(), body);

    let (status, deleted) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&deleted).unwrap(), body);

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/v1/users/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_and_update_over_http() {
    let Pipeline { app, .. } = pipeline(Duration::from_secs(5)).await;

    let (status, listed) = send(&app, Method::GET, "/api/v1/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&listed).unwrap(), json!([]));

    let user = User::new(Uuid::new_v4(), "alice", "x");
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/users",
        Some(serde_json::to_value(&user).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/v1/users/{}", user.id);
    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"login": "alice2", "password": "y"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let expected = User::new(user.id, "alice2", "y");
    assert_eq!(serde_json::from_slice::<User>(&updated).unwrap(), expected);

    let (status, listed) = send(&app, Method::GET, "/api/v1/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_slice::<Vec<User>>(&listed).unwrap(),
        vec![expected]
    );
}

#[tokio::test]
async fn test_update_missing_user_is_not_found() {
    let Pipeline { app, storage } = pipeline(Duration::from_secs(5)).await;

    let uri = format!("/api/v1/users/{}", Uuid::new_v4());
    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"login": "ghost", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, listed) = send(&app, Method::GET, "/api/v1/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&listed).unwrap(), json!([]));
    assert_eq!(storage.operations(), 3);
}

#[tokio::test]
async fn test_expired_request_never_reaches_storage() {
    let Pipeline { app, storage } = pipeline(Duration::ZERO).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/users",
        Some(json!({"id": Uuid::new_v4(), "login": "alice", "password": "x"})),
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(
        serde_json::from_slice::<Value>(&body).unwrap(),
        json!({"error": "request timed out"})
    );
    assert_eq!(storage.operations(), 0);
}
