pub mod anthropic;
pub mod github;
pub mod keyring;
pub mod merge;

#[cfg(test)]
pub(crate) mod stub;

use reqwest::StatusCode;

/// Failures talking to a remote service.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("incomplete GitHub configuration: {0} is missing")]
    Configuration(&'static str),
    #[error("GitHub {0} may not contain '/', '?' or '#'")]
    InvalidName(&'static str),
    #[error("{operation} failed with status {status}")]
    Fetch {
        operation: &'static str,
        status: StatusCode,
    },
    #[error("unexpected response from {operation}: {source}")]
    Parse {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Current sync status displayed in the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyncStatus {
    #[default]
    Idle,
    Error(String),
    LastSynced(String), // formatted timestamp
}

/// State of the tracker connection settings form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Idle,
    Connected,
    Failed,
}
