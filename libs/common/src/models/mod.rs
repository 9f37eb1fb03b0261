//! Canonical entity models shared by both services

pub mod user;

pub use user::User;
