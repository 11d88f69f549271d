//! Error types for the task API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers distinguish "the task
//! does not exist" from "the server returned an unexpected status." Both carry
//! the server's own `error` text when the failure body was a JSON envelope.
//! None of these escape [`TaskApi`](crate::TaskApi): they are flattened into a
//! `success: false` envelope at that boundary.

use thiserror::Error;

/// Errors produced while building, executing or parsing a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, ...).
    #[error("network error: {0}")]
    Transport(String),

    /// The server returned 404.
    #[error("HTTP 404: {}", .detail.as_deref().unwrap_or("resource not found"))]
    NotFound { detail: Option<String> },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {}", .detail.as_deref().unwrap_or("request failed"))]
    HttpStatus { status: u16, detail: Option<String> },

    /// The response body was not the expected JSON envelope.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}
