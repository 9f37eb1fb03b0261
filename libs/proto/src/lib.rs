//! Wire contract of the `users.UsersService` RPC service
//!
//! The message types below are the protobuf encoding of the user entity and
//! of each procedure's request and response. Client and server stubs are
//! generated at build time into [`users_service_client`] and
//! [`users_service_server`].

use thiserror::Error;
use uuid::Uuid;

#[allow(clippy::all)]
mod generated {
    include!(concat!(env!("OUT_DIR"), "/users.UsersService.rs"));
}

pub use generated::{users_service_client, users_service_server};

/// Wire form of a user
#[derive(Clone, PartialEq, prost::Message)]
pub struct User {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub login: String,
    #[prost(string, tag = "3")]
    pub password: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetUsersRequest {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetUsersResponse {
    #[prost(message, repeated, tag = "1")]
    pub users: Vec<User>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetUserByIdRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetUserByIdResponse {
    #[prost(message, optional, tag = "1")]
    pub user: Option<User>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct InsertRequest {
    #[prost(message, optional, tag = "1")]
    pub user: Option<User>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct InsertResponse {
    #[prost(message, optional, tag = "1")]
    pub user: Option<User>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UpdateRequest {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(message, optional, tag = "2")]
    pub user: Option<User>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UpdateResponse {
    #[prost(message, optional, tag = "1")]
    pub user: Option<User>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DeleteRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DeleteResponse {
    #[prost(message, optional, tag = "1")]
    pub user: Option<User>,
}

/// A wire identifier that is not a UUID
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid user id {value:?}: must be a uuid")]
pub struct InvalidUserId {
    pub value: String,
}

/// Parse a wire identifier
pub fn parse_user_id(value: &str) -> Result<Uuid, InvalidUserId> {
    Uuid::parse_str(value).map_err(|_| InvalidUserId {
        value: value.to_string(),
    })
}

impl From<common::User> for User {
    fn from(user: common::User) -> Self {
        Self {
            id: user.id.to_string(),
            login: user.login,
            password: user.password,
        }
    }
}

impl TryFrom<User> for common::User {
    type Error = InvalidUserId;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_user_id(&user.id)?,
            login: user.login,
            password: user.password,
        })
    }
}
