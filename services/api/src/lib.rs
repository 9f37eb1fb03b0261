//! API service
//!
//! Public HTTP surface for users. Handlers in [`routes`] call the domain
//! [`service`], which reaches the users service through the gRPC adapter in
//! [`storage::grpc`].

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod service;
pub mod state;
pub mod storage;
