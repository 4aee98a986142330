//! Error types for the expenses client.
//!
//! # Design
//! `ApiError` classifies remote failures the way callers act on them:
//! `NotFound` (the record is gone), `Validation` (the backend rejected the
//! payload, 4xx), and `Transport` (network failure or any other non-2xx).
//! `FormError` covers local required-field and parse failures, which never
//! reach the network. `AppError` is what the container returns for misuse.

use thiserror::Error;

/// Errors from building requests, executing them, or parsing responses.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// The server returned 404; the addressed expense does not exist.
    #[error("expense not found")]
    NotFound,

    /// The server rejected the request with a 4xx other than 404.
    #[error("rejected by server (HTTP {status}): {message}")]
    Validation { status: u16, message: String },

    /// The request never completed, or the server answered with a status
    /// that is neither 2xx nor a classified 4xx.
    #[error("{}", transport_message(.status, .message))]
    Transport { status: Option<u16>, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// A transport failure with no HTTP status, e.g. connection refused.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }
}

fn transport_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("transport error (HTTP {status}): {message}"),
        None => format!("transport error: {message}"),
    }
}

/// Local validation failures raised before any request is built.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("description is required")]
    MissingDescription,

    #[error("amount is required")]
    MissingAmount,

    #[error("amount {0:?} is not a number")]
    InvalidAmount(String),

    #[error("date {0:?} is not a valid YYYY-MM-DD date")]
    InvalidDate(String),
}

/// Errors returned directly by `ExpenseApp` operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AppError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("no expense with id {0} in the current list")]
    UnknownExpense(crate::types::ExpenseId),
}
