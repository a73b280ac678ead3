//! Error types for the store clients and remote backends.
//!
//! Not-found is deliberately absent from the taxonomy: `get_by_id`
//! returns `Ok(None)` for a missing record, and most record services
//! report a missing update target as a generic write failure anyway.

use serde::Serialize;
use thiserror::Error;

/// Transport-level failure talking to the record service: connection,
/// TLS, non-2xx status, or an undecodable body. Distinct from a
/// well-formed envelope that reports `success == false`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

/// Failure surfaced by a store client CRUD call.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A read call came back with `success == false`. Carries the
    /// service-provided message for display.
    #[error("Fetch failed: {0}")]
    RemoteFetch(String),

    /// A write call was rejected at the batch level, or no record in
    /// the batch succeeded. Carries every field-level validation
    /// message plus any record-level message.
    #[error("Write failed: {}", messages.join("; "))]
    RemoteWrite { messages: Vec<String> },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl StoreError {
    pub fn write(messages: Vec<String>) -> StoreError {
        StoreError::RemoteWrite { messages }
    }
}

/// Serializable error representation for display surfaces.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiError {
    pub message: String,
    pub kind: UiErrorKind,
    pub can_retry: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UiErrorKind {
    Fetch,
    Write,
    Transport,
}

impl From<&StoreError> for UiError {
    fn from(err: &StoreError) -> Self {
        let kind = match err {
            StoreError::RemoteFetch(_) => UiErrorKind::Fetch,
            StoreError::RemoteWrite { .. } => UiErrorKind::Write,
            StoreError::Transport(_) => UiErrorKind::Transport,
        };
        UiError {
            message: err.to_string(),
            kind,
            // Service-side rejections carry validation detail; retrying
            // without changing the input will fail the same way.
            can_retry: matches!(kind, UiErrorKind::Transport),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_error_joins_all_messages() {
        let err = StoreError::write(vec![
            "email: invalid".to_string(),
            "Name: is required".to_string(),
        ]);
        assert_eq!(err.to_string(), "Write failed: email: invalid; Name: is required");
    }

    #[test]
    fn ui_error_classifies_and_gates_retry() {
        let fetch = StoreError::RemoteFetch("service unavailable".to_string());
        let ui = UiError::from(&fetch);
        assert!(!ui.can_retry);
        assert!(ui.message.contains("service unavailable"));

        let transport = StoreError::Transport(TransportError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        });
        let ui = UiError::from(&transport);
        assert!(ui.can_retry);
    }
}
