// @file: symbol_poller/src/core/errors.rs
// @description: Error types for the venue boundary, the batch store and service startup.
// @author: LAS.

use std::time::Duration;
use thiserror::Error;

/// Failures reported by a venue client. All of them are symbol-local or listing-local
/// except when raised while the client is being built.
#[derive(Error, Debug)]
pub enum VenueError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Unsupported exchange: {0}")]
    UnsupportedExchange(String),

    #[error("Invalid venue configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for VenueError {
    fn from(err: serde_json::Error) -> Self {
        VenueError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for VenueError {
    fn from(err: url::ParseError) -> Self {
        VenueError::InvalidConfig(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("No free output name for {0}")]
    NameExhausted(String),
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Venue client initialization failed: {0}")]
    Connect(#[source] VenueError),

    #[error("Service already started")]
    AlreadyStarted,

    #[error("Service is not connected to a venue")]
    NotConnected,
}
