//! Application-wide error types.

use thiserror::Error;

use crate::picture::ResolveError;
use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("usage error: {0}")]
    Usage(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
