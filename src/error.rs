use std::any::Any;
use std::fmt::Write as _;

use serde_json::Value;

pub(crate) const UNKNOWN_ERROR: &str = "Unknown error";

/// Uniform failure shape every stage ends up holding, whatever went wrong.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub(crate) struct FetchError {
    pub(crate) message: String,
    pub(crate) http_status: Option<u16>,
    pub(crate) body: Option<Value>,
}

impl FetchError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            http_status: None,
            body: None,
        }
    }

    pub(crate) fn unknown() -> Self {
        Self::new(UNKNOWN_ERROR)
    }

    pub(crate) fn status(http_status: u16, body: Value) -> Self {
        Self {
            message: format!("Request failed: {http_status}"),
            http_status: Some(http_status),
            body: Some(body),
        }
    }

    pub(crate) fn with_status(mut self, http_status: u16) -> Self {
        self.http_status = Some(http_status);
        self
    }

    pub(crate) fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// One-line rendering: `Error: <message> (HTTP <status>)`.
    pub(crate) fn summary(&self) -> String {
        let mut out = format!("Error: {}", self.message);
        if let Some(status) = self.http_status {
            let _ = write!(out, " (HTTP {status})");
        }
        out
    }

    pub(crate) fn pretty_body(&self) -> Option<String> {
        let body = self.body.as_ref()?;
        match body {
            Value::String(text) => Some(text.clone()),
            other => serde_json::to_string_pretty(other).ok(),
        }
    }
}

pub(crate) fn normalize_error(err: &anyhow::Error) -> FetchError {
    if let Some(fetch) = err.downcast_ref::<FetchError>() {
        let mut normalized = fetch.clone();
        if normalized.message.trim().is_empty() {
            normalized.message = UNKNOWN_ERROR.to_string();
        }
        return normalized;
    }

    let message = format!("{err:#}");
    if message.trim().is_empty() {
        FetchError::unknown()
    } else {
        FetchError::new(message)
    }
}

/// Same contract as [`normalize_error`] for the payload of a panicked fetch task.
pub(crate) fn normalize_panic(payload: &(dyn Any + Send)) -> FetchError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .filter(|text| !text.trim().is_empty());
    match message {
        Some(message) => FetchError::new(message),
        None => FetchError::unknown(),
    }
}
