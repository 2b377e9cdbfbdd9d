//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod config;
pub mod discord;
pub mod http_fetcher;
pub mod ports;
pub mod sqlite;
pub mod steam_api;
