//! Error types for the sync layer.
//!
//! # Design
//! Two layers. `ApiError` is what the gateway boundary produces: one variant
//! per failure kind (status class, transport, decode), carrying the raw
//! status and body for diagnostics. `SyncError` is the closed, flat taxonomy
//! handed to the presentation layer; every variant carries a single
//! human-readable detail string and nothing else.
//!
//! `classify` is the only bridge between the two. It is keyed by the
//! operation that failed because the same gateway failure reads differently
//! to a user depending on what they were doing (a 401 on login is bad
//! credentials, a 401 on registration is a rejected registration).

use thiserror::Error;

/// Failures produced at the gateway boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server returned 401 or 403.
    #[error("HTTP {status}: {body}")]
    Unauthorized { status: u16, body: String },

    /// The server returned a 4xx other than 401/403, e.g. a duplicate
    /// registration or an unknown task id.
    #[error("HTTP {status}: {body}")]
    ClientRejected { status: u16, body: String },

    /// The server returned a 5xx, or any other non-2xx status.
    #[error("HTTP {status}: {body}")]
    ServerError { status: u16, body: String },

    /// Connection, DNS or timeout failure; no response was received.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("malformed response body: {0}")]
    Decode(String),

    /// The request payload could not be serialized.
    #[error("could not encode request: {0}")]
    Encode(String),
}

/// The user-facing error taxonomy. Callers only ever display `detail()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("{0}")]
    RegistrationFailed(String),
    #[error("{0}")]
    NotAuthenticated(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    FetchFailed(String),
    #[error("{0}")]
    AddFailed(String),
    #[error("{0}")]
    UpdateFailed(String),
    #[error("{0}")]
    OperationFailed(String),
}

impl SyncError {
    /// The displayable message for this failure.
    pub fn detail(&self) -> &str {
        match self {
            SyncError::ValidationError(d)
            | SyncError::InvalidCredentials(d)
            | SyncError::RegistrationFailed(d)
            | SyncError::NotAuthenticated(d)
            | SyncError::NotFound(d)
            | SyncError::FetchFailed(d)
            | SyncError::AddFailed(d)
            | SyncError::UpdateFailed(d)
            | SyncError::OperationFailed(d) => d,
        }
    }

    /// Build a `ValidationError` naming every empty field, or `None` when all
    /// fields are filled. Whitespace-only values count as empty.
    pub fn missing_fields(fields: &[(&str, &str)]) -> Option<SyncError> {
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if missing.is_empty() {
            return None;
        }
        Some(SyncError::ValidationError(format!(
            "missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// The operation a gateway failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login,
    Fetch,
    Add,
    Update,
}

/// Map a gateway failure to the user-facing taxonomy.
pub fn classify(operation: Operation, err: &ApiError) -> SyncError {
    let rejected = matches!(
        err,
        ApiError::Unauthorized { .. } | ApiError::ClientRejected { .. }
    );
    match operation {
        Operation::Register if rejected => {
            SyncError::RegistrationFailed(with_body("registration failed", err))
        }
        // Never echo the server's detail here; it may reveal which field was wrong.
        Operation::Login if rejected => {
            SyncError::InvalidCredentials("invalid email or password".to_string())
        }
        Operation::Register | Operation::Login => {
            SyncError::OperationFailed(format!("an error occurred: {err}"))
        }
        Operation::Fetch => SyncError::FetchFailed(format!("failed to fetch tasks: {err}")),
        Operation::Add => SyncError::AddFailed(format!("failed to add task: {err}")),
        Operation::Update => SyncError::UpdateFailed(format!("failed to update task: {err}")),
    }
}

fn with_body(prefix: &str, err: &ApiError) -> String {
    match err {
        ApiError::Unauthorized { body, .. } | ApiError::ClientRejected { body, .. }
            if !body.trim().is_empty() =>
        {
            format!("{prefix}: {}", body.trim())
        }
        _ => prefix.to_string(),
    }
}
