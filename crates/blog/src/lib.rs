//! Inkpost blog library.
//!
//! A server-rendered blog: everyone can read, signed-in users comment, and
//! the first registered account (the owner) publishes, edits and deletes
//! posts. The binary in `main.rs` wires this library to a real database and
//! Sentry; the integration tests drive [`routes::app`] directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
