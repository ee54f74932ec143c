//! Error types for the API client.
//!
//! # Design
//! Argument and configuration checks get their own variants so callers can
//! tell a programming mistake from a failed round-trip. Transport failures are
//! carried through untouched; nothing here retries or rewrites them.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors returned by configuration setters, the dispatcher, and `ApiManager`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A base URL was set to something other than a string or null.
    #[error("url must be a string or null")]
    ConfigType,

    /// A verb helper was called without an endpoint or configuration.
    #[error("endpoint or config cannot be undefined")]
    MissingArgument,

    /// The transport failed to complete the round-trip.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body (or a configuration document) was not valid JSON.
    #[error("failed to decode JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// A structured request body could not be encoded as JSON.
    #[error("failed to encode request body: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;
