//! Users service
//!
//! Serves the `users.UsersService` RPC contract on top of PostgreSQL. The
//! layers are wired bottom-up: [`storage`] talks to the database, [`service`]
//! owns the domain error mapping and [`grpc`] adapts both to the wire.

pub mod config;
pub mod grpc;
pub mod service;
pub mod storage;
