// Library root: exposes the orchestration layer to the binary and integration tests.
// The binary entry point is src/main.rs.

pub mod classify;
pub mod config;
pub mod enrich;
pub mod error;
pub mod logger;
pub mod measurements;
pub mod model;
pub mod picture;
pub mod search;
pub mod service;
pub mod transport;
