//! Errors surfaced by the SDK.
//!
//! Callers only ever observe two families:
//!
//! - [`Api`] when the network layer or the server rejected a request. Nothing
//!   local is touched in that case.
//! - local preconditions such as [`KeyNotFound`] (an update for a row that is
//!   not cached) or [`StoreNotReady`], raised before any request is sent.
//!
//! Failures of the cache write that follows a successful request are logged
//! and never returned.
//!
//!  [`Api`]: EngineError::Api
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`StoreNotReady`]: EngineError::StoreNotReady
use api_types::UnknownVariant;
use sea_orm::DbErr;
use thiserror::Error;

/// Transport and API failures, mapped from the HTTP status.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl PartialEq for ApiError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unauthorized, Self::Unauthorized) => true,
            (Self::Forbidden, Self::Forbidden) => true,
            (Self::NotFound, Self::NotFound) => true,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Server(a), Self::Server(b)) => a == b,
            (Self::Transport(a), Self::Transport(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// SDK custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("cache store has not been opened")]
    StoreNotReady,
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Setup error: {0}")]
    Setup(String),
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<UnknownVariant> for EngineError {
    fn from(value: UnknownVariant) -> Self {
        Self::InvalidValue(value.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidValue(value.to_string())
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Api(a), Self::Api(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::StoreNotReady, Self::StoreNotReady) => true,
            (Self::InvalidValue(a), Self::InvalidValue(b)) => a == b,
            (Self::Setup(a), Self::Setup(b)) => a == b,
            (Self::Config(a), Self::Config(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
